//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : contenir l’état de la fenêtre (entrée, résultat, erreur, démarche, options)
//! et offrir des opérations simples (C/CLR/AC) sans logique d’affichage.
//!
//! Le registre est construit une fois et partagé en lecture par chaque évaluation.

use resolveur_expr::noyau::{Config, Demarche, Registre};

/// Opérateur visé par la réécriture “puissance négative”.
pub const OPERATEUR_PUISSANCE_NEGATIVE: &str = "&";

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String,
    pub erreur: String,

    // --- démarche (panneau d’explication) ---
    pub demarche: Demarche,

    // --- noyau ---
    pub registre: Registre,
    pub config: Config,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self {
            entree: String::new(),
            resultat: String::new(),
            erreur: String::new(),
            demarche: Demarche::default(),
            registre: Registre::standard(),
            config: Config::default(),
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
        }
    }
}

impl AppCalc {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + options par défaut).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
        self.config = Config::default();
        self.focus_entree = true;
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultat + erreur + démarche (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur.clear();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// On CONSERVE le dernier résultat pour ne pas “effacer l’écran” sur une faute.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    pub fn set_resultats(&mut self, resultat: impl Into<String>, demarche: Demarche) {
        self.erreur.clear();
        self.resultat = resultat.into();
        self.demarche = demarche;
        self.focus_entree = true;
    }

    pub fn separateur(&self) -> char {
        self.config.separateur_decimal()
    }

    /// Le séparateur est validé par le noyau ; un refus devient une erreur affichée.
    pub fn set_separateur(&mut self, separateur: char) {
        match self.config.clone().avec_separateur(separateur) {
            Ok(config) => self.config = config,
            Err(e) => self.set_erreur(e.to_string()),
        }
        self.focus_entree = true;
    }

    pub fn puissance_negative(&self) -> bool {
        self.config.puissance_negative().is_some()
    }

    pub fn set_puissance_negative(&mut self, actif: bool) {
        let config = self.config.clone();
        self.config = if actif {
            config.avec_puissance_negative(OPERATEUR_PUISSANCE_NEGATIVE)
        } else {
            config.sans_puissance_negative()
        };
        self.focus_entree = true;
    }
}
