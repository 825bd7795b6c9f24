//! Noyau du résolveur d’expressions
//!
//! Organisation interne :
//! - erreur.rs   : taxonomie d’erreurs (thiserror)
//! - registre.rs : opérateurs / fonctions (nom, priorité, arité, calcul)
//! - standard.rs : table par défaut (+ - * / ^ & abs sqrt sin ...)
//! - config.rs   : séparateur décimal + réécriture “puissance négative”
//! - jetons.rs   : tokenisation à contextes (flux paresseux)
//! - rpn.rs      : shunting-yard
//! - eval.rs     : évaluation postfixe + pipeline complet

pub mod config;
pub mod erreur;
pub mod eval;
pub mod jetons;
pub mod registre;
pub mod rpn;
pub mod standard;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use config::Config;
pub use erreur::{Erreur, ErreurCalcul, Resultat};
pub use eval::{eval_detaille, eval_expression, evaluate_rpn, Demarche};
pub use jetons::{tokenize, Jeton, Tokenizer, TypeJeton};
pub use registre::{Associativite, Descripteur, Registre};
pub use rpn::to_rpn;
