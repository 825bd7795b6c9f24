// src/noyau/erreur.rs
//
// Erreurs du noyau (une seule énumération pour tout le pipeline).
//
// Règles :
// - `thiserror` pour Display/Error, pas d’impl manuelle.
// - Chaque étape échoue au premier problème : pas de résultat partiel.

use thiserror::Error;

use super::jetons::Contexte;

pub type Resultat<T> = Result<T, Erreur>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Erreur {
    /* ------------------------ Jetons ------------------------ */
    /// Littéral mal formé (signes, séparateur, exposant).
    #[error("littéral mal formé '{lexeme}' (contexte {contexte}) : {raison}")]
    Tokenisation {
        lexeme: String,
        contexte: Contexte,
        raison: &'static str,
    },

    #[error("jeton inconnu '{lexeme}' à la position {position}")]
    JetonInconnu { lexeme: String, position: usize },

    /// Une fonction doit être suivie immédiatement de '('.
    #[error("appel de fonction mal formé : '{fonction}' suivi de '{suivant}'")]
    AppelFonctionMalforme { fonction: String, suivant: String },

    #[error("jeton inattendu '{lexeme}' (contexte {contexte})")]
    JetonInattendu { lexeme: String, contexte: Contexte },

    /* ------------------------ RPN ------------------------ */
    #[error("parenthèses déséquilibrées : {0}")]
    ParenthesesDesequilibrees(&'static str),

    /* ------------------------ Évaluation ------------------------ */
    #[error("opérandes insuffisants pour '{operation}'")]
    PileInsuffisante { operation: String },

    #[error("expression invalide : {restants} valeurs restent sur la pile")]
    PostfixeMalforme { restants: usize },

    #[error("nombre invalide '{0}'")]
    FormatNombre(String),

    #[error("échec de '{operation}' : {source}")]
    Calcul {
        operation: String,
        #[source]
        source: ErreurCalcul,
    },

    /* ------------------------ Registre / config ------------------------ */
    #[error("opération inconnue '{0}'")]
    OperationInconnue(String),

    #[error("opération déjà enregistrée '{0}'")]
    OperationDupliquee(String),

    #[error("nom d’opération invalide '{0}'")]
    NomInvalide(String),

    #[error("séparateur décimal invalide '{0}'")]
    SeparateurInvalide(char),
}

/// Échec d’une fonction de calcul (table d’opérations).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErreurCalcul {
    #[error("division par zéro")]
    DivisionParZero,

    /// Résultat réel indéfini (ex: racine d’un négatif).
    #[error("hors domaine : {0}")]
    HorsDomaine(String),
}
