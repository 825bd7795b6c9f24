// src/noyau/standard.rs
//
// Table d’opérations par défaut (données de configuration, pas d’algorithme).
//
// Politique de domaine :
// - '/' par zéro => ErreurCalcul::DivisionParZero
// - résultat réel indéfini (NaN depuis des arguments non-NaN) => HorsDomaine
// - les infinis (ln(0), 1e308*10) passent tels quels

use super::erreur::ErreurCalcul;
use super::registre::{Associativite, Descripteur, Registre};

fn reel(resultat: f64, entrees: &[f64], nom: &str) -> Result<f64, ErreurCalcul> {
    if resultat.is_nan() && !entrees.iter().any(|x| x.is_nan()) {
        let args: Vec<String> = entrees.iter().map(f64::to_string).collect();
        return Err(ErreurCalcul::HorsDomaine(format!("{nom}({})", args.join(", "))));
    }
    Ok(resultat)
}

fn puissance(a: f64, b: f64) -> Result<f64, ErreurCalcul> {
    reel(a.powf(b), &[a, b], "pow")
}

fn division(a: f64, b: f64) -> Result<f64, ErreurCalcul> {
    if b == 0.0 {
        return Err(ErreurCalcul::DivisionParZero);
    }
    reel(a / b, &[a, b], "/")
}

/// Fonctions unaires (toutes priorité 0 : toujours parenthésées).
const FONCTIONS: &[(&str, fn(f64) -> f64)] = &[
    ("abs", f64::abs),
    ("sqrt", f64::sqrt),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("sinh", f64::sinh),
    ("cosh", f64::cosh),
    ("tanh", f64::tanh),
    ("log", f64::log10),
    ("ln", f64::ln),
    ("exp", f64::exp),
];

pub fn descripteurs() -> Vec<Descripteur> {
    use Associativite::{Droite, Gauche};

    let mut out = vec![
        Descripteur::operateur("+", 0, Gauche, |a, b| reel(a + b, &[a, b], "+")),
        Descripteur::operateur("-", 0, Gauche, |a, b| reel(a - b, &[a, b], "-")),
        Descripteur::operateur("*", 1, Gauche, |a, b| reel(a * b, &[a, b], "*")),
        Descripteur::operateur("/", 1, Gauche, division),
        Descripteur::operateur("^", 2, Droite, puissance),
        // ancienne écriture de la puissance (cf. réécriture “puissance négative”)
        Descripteur::operateur("&", 2, Droite, puissance),
    ];

    for &(nom, f) in FONCTIONS {
        out.push(Descripteur::fonction(nom, 0, move |x| reel(f(x), &[x], nom)));
    }

    out
}

impl Registre {
    /// Registre par défaut : + - * / ^ & et les fonctions usuelles.
    ///
    /// La table de `descripteurs()` est fixe : noms valides et deux à deux
    /// distincts (vérifié par `table_complete`), donc aucun `register` n’échoue.
    /// Pour une table fournie par l’appelant, passer par `Registre::build`,
    /// qui remonte la première erreur.
    pub fn standard() -> Self {
        let mut registre = Registre::new();
        for d in descripteurs() {
            if let Err(e) = registre.register(d) {
                tracing::error!("table standard invalide : {e}");
            }
        }
        registre
    }
}
