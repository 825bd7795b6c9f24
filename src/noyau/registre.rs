// src/noyau/registre.rs
//
// Registre des opérations (opérateurs binaires + fonctions unaires).
//
// Contrats :
// - Identité = nom canonique (minuscules). Priorité / arité / calcul n’en font pas partie.
// - Construit une fois, puis partagé en lecture seule par les étapes du pipeline.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::erreur::{Erreur, ErreurCalcul, Resultat};
use super::jetons::TypeJeton;

pub type CalculBinaire = Arc<dyn Fn(f64, f64) -> Result<f64, ErreurCalcul> + Send + Sync>;
pub type CalculUnaire = Arc<dyn Fn(f64) -> Result<f64, ErreurCalcul> + Send + Sync>;

/// Clé canonique : nom en minuscules.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nom(String);

impl Nom {
    pub fn new(nom: &str) -> Self {
        Self(nom.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nom “mot” (sin, ln...) : lettres seulement.
    pub fn est_mot(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(char::is_alphabetic)
    }

    /// Nom “symbole” (+, **, ...) : aucun caractère réservé au scan des nombres/parenthèses.
    pub fn est_symbole(&self) -> bool {
        !self.0.is_empty()
            && self.0.chars().all(|c| {
                !c.is_alphanumeric()
                    && !c.is_whitespace()
                    && !matches!(c, '(' | ')' | '.' | ',')
            })
    }
}

impl fmt::Display for Nom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativite {
    Gauche,
    Droite,
}

/// Variante étiquetée : l’arité découle de la variante.
#[derive(Clone)]
pub enum Operation {
    Operateur {
        associativite: Associativite,
        calcul: CalculBinaire,
    },
    Fonction {
        calcul: CalculUnaire,
    },
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Operateur { associativite, .. } => f
                .debug_struct("Operateur")
                .field("associativite", associativite)
                .finish_non_exhaustive(),
            Operation::Fonction { .. } => f.debug_struct("Fonction").finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Descripteur {
    nom: Nom,
    priorite: u32,
    operation: Operation,
}

impl Descripteur {
    pub fn operateur<F>(nom: &str, priorite: u32, associativite: Associativite, calcul: F) -> Self
    where
        F: Fn(f64, f64) -> Result<f64, ErreurCalcul> + Send + Sync + 'static,
    {
        Self {
            nom: Nom::new(nom),
            priorite,
            operation: Operation::Operateur {
                associativite,
                calcul: Arc::new(calcul),
            },
        }
    }

    pub fn fonction<F>(nom: &str, priorite: u32, calcul: F) -> Self
    where
        F: Fn(f64) -> Result<f64, ErreurCalcul> + Send + Sync + 'static,
    {
        Self {
            nom: Nom::new(nom),
            priorite,
            operation: Operation::Fonction {
                calcul: Arc::new(calcul),
            },
        }
    }

    pub fn nom(&self) -> &Nom {
        &self.nom
    }

    pub fn priorite(&self) -> u32 {
        self.priorite
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn arite(&self) -> usize {
        match self.operation {
            Operation::Operateur { .. } => 2,
            Operation::Fonction { .. } => 1,
        }
    }

    /// Faux pour une fonction (sans objet), jamais d’erreur.
    pub fn est_associatif_gauche(&self) -> bool {
        matches!(
            self.operation,
            Operation::Operateur {
                associativite: Associativite::Gauche,
                ..
            }
        )
    }

    /// Genre de jeton émis par le tokenizer pour ce nom.
    pub fn type_jeton(&self) -> TypeJeton {
        match self.operation {
            Operation::Operateur { .. } => TypeJeton::Operateur,
            Operation::Fonction { .. } => TypeJeton::Fonction,
        }
    }
}

impl PartialEq for Descripteur {
    fn eq(&self, other: &Self) -> bool {
        self.nom == other.nom
    }
}

impl Eq for Descripteur {}

impl Hash for Descripteur {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nom.hash(state);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Registre {
    entrees: HashMap<Nom, Descripteur>,
    // ordre d’enregistrement (énumération stable)
    ordre: Vec<Nom>,
}

impl Registre {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit un registre à partir d’une liste de descripteurs.
    pub fn build<I>(descripteurs: I) -> Resultat<Self>
    where
        I: IntoIterator<Item = Descripteur>,
    {
        let mut registre = Self::new();
        for d in descripteurs {
            registre.register(d)?;
        }
        Ok(registre)
    }

    pub fn register(&mut self, descripteur: Descripteur) -> Resultat<()> {
        let nom = descripteur.nom.clone();

        // "e" est réservé au marqueur d’exposant
        let valide = (nom.est_mot() && nom.as_str() != "e") || nom.est_symbole();
        if !valide {
            return Err(Erreur::NomInvalide(nom.to_string()));
        }
        if self.entrees.contains_key(&nom) {
            return Err(Erreur::OperationDupliquee(nom.to_string()));
        }

        tracing::trace!(nom = %nom, priorite = descripteur.priorite, "opération enregistrée");
        self.ordre.push(nom.clone());
        self.entrees.insert(nom, descripteur);
        Ok(())
    }

    pub fn lookup(&self, nom: &str) -> Resultat<&Descripteur> {
        self.entrees
            .get(&Nom::new(nom))
            .ok_or_else(|| Erreur::OperationInconnue(nom.to_string()))
    }

    pub fn is_known(&self, nom: &str) -> bool {
        self.entrees.contains_key(&Nom::new(nom))
    }

    /// Compare deux opérations par priorité.
    pub fn compare(&self, a: &str, b: &str) -> Resultat<Ordering> {
        Ok(self.lookup(a)?.priorite.cmp(&self.lookup(b)?.priorite))
    }

    pub fn is_left_associative(&self, nom: &str) -> Resultat<bool> {
        Ok(self.lookup(nom)?.est_associatif_gauche())
    }

    pub fn names(&self) -> impl Iterator<Item = &Nom> {
        self.ordre.iter()
    }

    pub fn len(&self) -> usize {
        self.ordre.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordre.is_empty()
    }
}
