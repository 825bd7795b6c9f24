// src/noyau/config.rs
//
// Options externes du noyau.
// - séparateur décimal : le caractère qui remplace '.' ou ',' dans les jetons Nombre
// - réécriture “puissance négative” : désactivée par défaut

use super::erreur::{Erreur, Resultat};

pub const SEPARATEUR_DEFAUT: char = '.';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    separateur_decimal: char,
    puissance_negative: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            separateur_decimal: SEPARATEUR_DEFAUT,
            puissance_negative: None,
        }
    }
}

impl Config {
    /// Refuse un séparateur qui se confondrait avec un chiffre, un signe,
    /// une parenthèse, un blanc ou le marqueur d’exposant.
    pub fn avec_separateur(mut self, separateur: char) -> Resultat<Self> {
        let ambigu = separateur.is_ascii_digit()
            || separateur.is_whitespace()
            || matches!(separateur, '+' | '-' | '(' | ')' | 'e' | 'E');
        if ambigu {
            return Err(Erreur::SeparateurInvalide(separateur));
        }
        self.separateur_decimal = separateur;
        Ok(self)
    }

    /// Active la réécriture `-a op b` => `-1 * (a) op b` pour l’opérateur donné.
    pub fn avec_puissance_negative(mut self, operateur: &str) -> Self {
        self.puissance_negative = Some(operateur.to_string());
        self
    }

    pub fn sans_puissance_negative(mut self) -> Self {
        self.puissance_negative = None;
        self
    }

    pub fn separateur_decimal(&self) -> char {
        self.separateur_decimal
    }

    pub fn puissance_negative(&self) -> Option<&str> {
        self.puissance_negative.as_deref()
    }
}
