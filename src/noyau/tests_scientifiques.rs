//! Tests scientifiques (campagne) : scénarios de référence + propriétés.
//!
//! - scénarios littéraux (priorités, associativité, signes, fonctions)
//! - politique d’erreurs (parenthèses, domaine, division)
//! - propriétés “pour toute expression” via proptest
//!
//! Note : "((3 - 1) * 5.5 - 2^2) + 3" vaut 10 avec les priorités usuelles
//! (2 * 5.5 = 11 ; 11 - 4 = 7 ; 7 + 3 = 10).

use std::time::{Duration, Instant};

use proptest::prelude::*;

use super::config::Config;
use super::erreur::{Erreur, ErreurCalcul};
use super::eval::eval_expression;
use super::jetons::{tokenize, TypeJeton};
use super::registre::Registre;

fn eval(expr: &str) -> Result<f64, Erreur> {
    eval_expression(expr, &Registre::standard(), &Config::default())
}

fn eval_ok(expr: &str) -> f64 {
    eval(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn assert_valeur(expr: &str, attendu: f64) {
    let v = eval_ok(expr);
    assert!(
        (v - attendu).abs() <= 1e-12 * attendu.abs().max(1.0),
        "expr={expr:?} v={v} attendu={attendu}"
    );
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Scénarios ------------------------ */

#[test]
fn sci_scenarios_litteraux() {
    assert_valeur("((3 - 1) * 5.5 - 2^2) + 3", 10.0);
    assert_valeur("2 * 3 + 2 ^ 2 * 4", 22.0);
    assert_valeur("5 -- 6", 11.0);
    assert_valeur("sqrt(16)", 4.0);
    assert_valeur("abs(-3)", 3.0);
}

#[test]
fn sci_associativite() {
    assert_valeur("2^3^2", 512.0);
    assert_valeur("2&3&2", 512.0);
    assert_valeur("100 / 10 / 5", 2.0);
    assert_valeur("10 - 5 - 2", 3.0);
    assert_valeur("2 * 3 ^ 2", 18.0);
}

#[test]
fn sci_repli_des_signes() {
    assert_valeur("--5", 5.0);
    assert_valeur("---5", -5.0);
    assert_valeur("----5", 5.0);
    assert_valeur("3 * --2", 6.0);
    assert_valeur("-(1 + 2) * 2", -6.0);
    assert_valeur("--(1 + 2)", 3.0);
}

#[test]
fn sci_exposants_et_separateurs() {
    assert_valeur("1.5e3 + 1", 1501.0);
    assert_valeur("2E-2 * 100", 2.0);
    assert_valeur("1,25 * 4", 5.0);
    assert_valeur("-2e+1", -20.0);
}

#[test]
fn sci_fonctions_imbriquees() {
    assert_valeur("sqrt(abs(-16)) + exp(0)", 5.0);
    assert_valeur("log(100) * ln(exp(3))", 6.0);
    assert_valeur("cos(0) - sin(0) + tan(0)", 1.0);
    assert_valeur("2 ^ sqrt(9)", 8.0);
}

/* ------------------------ Politique d’erreurs ------------------------ */

#[test]
fn sci_parentheses_desequilibrees() {
    for expr in ["(1+2", "1+2)", "((1)", "abs(1"] {
        assert!(
            matches!(eval(expr), Err(Erreur::ParenthesesDesequilibrees(_))),
            "expr={expr:?}"
        );
    }
}

#[test]
fn sci_domaine_documente() {
    // sqrt(-2) : erreur de domaine, jamais NaN
    assert!(matches!(
        eval("sqrt(-2)"),
        Err(Erreur::Calcul {
            source: ErreurCalcul::HorsDomaine(_),
            ..
        })
    ));
    assert!(matches!(
        eval("acos(3)"),
        Err(Erreur::Calcul {
            source: ErreurCalcul::HorsDomaine(_),
            ..
        })
    ));
    assert!(matches!(
        eval("5 / 0"),
        Err(Erreur::Calcul {
            source: ErreurCalcul::DivisionParZero,
            ..
        })
    ));
    assert_eq!(eval_ok("ln(0)"), f64::NEG_INFINITY);

    // opérateurs arithmétiques : infini - infini, 0 * infini, infini / infini
    for expr in [
        "exp(1000) - exp(1000)",
        "1e400 - 1e400",
        "0 * 1e400",
        "1e400 / 1e400",
    ] {
        assert!(
            matches!(
                eval(expr),
                Err(Erreur::Calcul {
                    source: ErreurCalcul::HorsDomaine(_),
                    ..
                })
            ),
            "expr={expr:?} => {:?}",
            eval(expr)
        );
    }
    assert_eq!(eval_ok("1e400 + 1"), f64::INFINITY);
}

#[test]
fn sci_entrees_malformees() {
    assert!(matches!(eval("2 +* 2"), Err(Erreur::JetonInattendu { .. })));
    assert!(matches!(eval("2 + x"), Err(Erreur::JetonInconnu { .. })));
    assert!(matches!(
        eval("sqrt 4"),
        Err(Erreur::AppelFonctionMalforme { .. })
    ));
    assert!(matches!(eval("1.2.3"), Err(Erreur::Tokenisation { .. })));
    assert!(matches!(eval("*"), Err(Erreur::JetonInattendu { .. })));
    assert_eq!(eval("   "), Ok(0.0));
}

/* ------------------------ Limites (bornées) ------------------------ */

#[test]
fn sci_profondeur_parentheses() {
    let t0 = Instant::now();
    let max = Duration::from_millis(250);

    let n = 2_000;
    let expr = format!("{}7{}", "(".repeat(n), ")".repeat(n));
    assert_valeur(&expr, 7.0);

    budget(t0, max);
}

#[test]
fn sci_longue_suite_de_signes() {
    let t0 = Instant::now();
    let max = Duration::from_millis(250);

    for n in [1usize, 2, 17, 1_000, 1_001] {
        let expr = format!("{}3", "-".repeat(n));
        let attendu = if n % 2 == 0 { 3.0 } else { -3.0 };
        assert_valeur(&expr, attendu);
        budget(t0, max);
    }
}

/* ------------------------ Propriétés ------------------------ */

const OPS: [&str; 3] = ["+", "-", "*"];

/// Valeur attendue avec les priorités usuelles (produits d’abord).
fn attendu_plat(premier: u32, suite: &[(usize, u32)]) -> f64 {
    let mut somme = 0.0;
    let mut terme = premier as f64;
    for &(op, v) in suite {
        let v = v as f64;
        match OPS[op] {
            "*" => terme *= v,
            "+" => {
                somme += terme;
                terme = v;
            }
            _ => {
                somme += terme;
                terme = -v;
            }
        }
    }
    somme + terme
}

proptest! {
    #[test]
    fn prop_arithmetique_usuelle(
        premier in 0u32..100,
        suite in prop::collection::vec((0usize..3, 0u32..100), 0..6),
    ) {
        let mut expr = premier.to_string();
        for &(op, v) in &suite {
            expr.push_str(&format!(" {} {v}", OPS[op]));
        }
        prop_assert_eq!(eval(&expr), Ok(attendu_plat(premier, &suite)), "expr={}", expr);
    }

    #[test]
    fn prop_litteral_aller_retour(x in -1.0e9f64..1.0e9) {
        let r = Registre::standard();
        for texte in [format!("{x}"), format!("{x:e}")] {
            let jetons = tokenize(&texte, &r, &Config::default()).unwrap();
            prop_assert_eq!(jetons.len(), 1);
            prop_assert_eq!(jetons[0].genre, TypeJeton::Nombre);
            prop_assert_eq!(jetons[0].lexeme.parse::<f64>().unwrap(), x);
        }
    }

    #[test]
    fn prop_parite_des_signes(n in 1usize..40, v in 0u32..1000) {
        let expr = format!("{}{v}", "-".repeat(n));
        let attendu = if n % 2 == 0 { v as f64 } else { -(v as f64) };
        prop_assert_eq!(eval(&expr), Ok(attendu));
    }

    #[test]
    fn prop_moins_devant_parenthese(a in -50i32..50, b in -50i32..50) {
        let interne = eval(&format!("({a} + {b})")).unwrap();
        prop_assert_eq!(eval(&format!("-({a} + {b})")), Ok(-interne));
    }
}
