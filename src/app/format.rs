// src/app/format.rs
//
// Affichage d’un résultat f64 (UI seulement, le noyau rend un f64 brut).
// - entier “raisonnable” : sans partie décimale
// - sinon 10 décimales max, zéros de queue retirés
// - très grand / très petit : notation scientifique
// - séparateur décimal : celui choisi dans l’UI

pub fn format_resultat(valeur: f64, separateur: char) -> String {
    if valeur.is_nan() {
        return "NaN".into();
    }
    if valeur.is_infinite() {
        return if valeur.is_sign_positive() { "∞" } else { "-∞" }.into();
    }

    let abs = valeur.abs();
    let brut = if valeur.fract() == 0.0 && abs < 1e15 {
        format!("{}", valeur as i64)
    } else if abs >= 1e15 || abs < 1e-6 {
        format!("{valeur:e}")
    } else {
        let s = format!("{valeur:.10}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    };

    if separateur == '.' {
        brut
    } else {
        brut.replace('.', &separateur.to_string())
    }
}
