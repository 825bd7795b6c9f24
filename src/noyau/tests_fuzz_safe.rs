//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - chaque expression générée porte sa valeur attendue (calcul direct en f64)
//! - seule erreur tolérée sur les expressions générées : division par zéro

use std::time::{Duration, Instant};

use super::config::Config;
use super::erreur::{Erreur, ErreurCalcul};
use super::eval::{eval_detaille, eval_expression};
use super::registre::Registre;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_attendue(e: &Erreur) -> bool {
    matches!(
        e,
        Erreur::Calcul {
            source: ErreurCalcul::DivisionParZero,
            ..
        }
    )
}

fn memes(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= 1e-9 * b.abs().max(1.0)
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

/// Expression + valeur attendue (None : une division par zéro a lieu).
type Genere = (String, Option<f64>);

fn gen_atom(rng: &mut Rng) -> Genere {
    match rng.pick(6) {
        0 => ("0".into(), Some(0.0)),
        1 => ("2.5".into(), Some(2.5)),
        2 => ("0,5".into(), Some(0.5)),
        3 => {
            let k = rng.pick(9) + 1;
            (format!("-{k}"), Some(-(k as f64)))
        }
        4 => ("1e1".into(), Some(10.0)),
        _ => {
            let k = rng.pick(10);
            (k.to_string(), Some(k as f64))
        }
    }
}

fn binaire(
    op: &str,
    (ga, va): Genere,
    (gb, vb): Genere,
) -> Genere {
    let texte = format!("({ga}{op}{gb})");
    let valeur = match (va, vb) {
        (Some(a), Some(b)) => match op {
            "+" => Some(a + b),
            "-" => Some(a - b),
            "*" => Some(a * b),
            _ if b == 0.0 => None,
            _ => Some(a / b),
        },
        _ => None,
    };
    (texte, valeur)
}

fn gen_expr(rng: &mut Rng, depth: usize) -> Genere {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(8) {
        0 => gen_atom(rng),
        1 => binaire("+", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        2 => binaire("-", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        3 => binaire("*", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        4 => binaire("/", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        5 => {
            let (g, v) = gen_expr(rng, depth - 1);
            (format!("abs({g})"), v.map(f64::abs))
        }
        6 => {
            // sqrt borné : toujours sur une valeur absolue
            let (g, v) = gen_expr(rng, depth - 1);
            (format!("sqrt(abs({g}))"), v.map(|x| x.abs().sqrt()))
        }
        _ => {
            let (g, v) = gen_expr(rng, depth - 1);
            if rng.coin() {
                (format!("(-{g})"), v.map(|x| -x))
            } else {
                (format!("(--{g})"), v)
            }
        }
    }
}

/// Entrée bruitée : mélange de fragments valides et invalides.
fn gen_bruit(rng: &mut Rng) -> String {
    const FRAGMENTS: &[&str] = &[
        "1", "2", "9", ".", ",", "e", "E", "+", "-", "*", "/", "^", "&", "(", ")", " ", "sqrt",
        "ln", "abs", "#", "x",
    ];
    let n = rng.pick(16) as usize;
    (0..n)
        .map(|_| FRAGMENTS[rng.pick(FRAGMENTS.len() as u32) as usize])
        .collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_valeurs_attendues() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let registre = Registre::standard();
    let config = Config::default();
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..200 {
        budget(t0, max);

        let (expr, attendu) = gen_expr(&mut rng, 5);

        match (eval_expression(&expr, &registre, &config), attendu) {
            (Ok(v), Some(a)) => {
                assert!(memes(v, a), "expr={expr:?} v={v} attendu={a}");
                seen_ok += 1;
            }
            (Err(e), None) => {
                assert!(
                    is_erreur_attendue(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
                seen_err += 1;
            }
            (obtenu, attendu) => {
                panic!("expr={expr:?} obtenu={obtenu:?} attendu={attendu:?}")
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_determinisme() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    let registre = Registre::standard();
    let config = Config::default();

    // Même seed => mêmes expressions => mêmes sorties
    let mut a = Rng::new(0xBADC0DE_u64);
    let mut b = a.clone();

    for _ in 0..80 {
        budget(t0, max);

        let (ea, _) = gen_expr(&mut a, 4);
        let (eb, _) = gen_expr(&mut b, 4);
        assert_eq!(ea, eb);

        let ra = eval_detaille(&ea, &registre, &config);
        let rb = eval_detaille(&eb, &registre, &config);
        assert_eq!(ra, rb, "expr={ea:?}");
    }
}

#[test]
fn fuzz_safe_bruit_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    let registre = Registre::standard();
    let config = Config::default();
    let mut rng = Rng::new(0x5EED_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..500 {
        budget(t0, max);

        let expr = gen_bruit(&mut rng);
        match eval_expression(&expr, &registre, &config) {
            Ok(_) => seen_ok += 1,
            Err(e) => {
                assert!(!e.to_string().is_empty(), "message vide: expr={expr:?}");
                seen_err += 1;
            }
        }
    }

    assert!(seen_ok > 0, "aucun succès sur le bruit");
    assert!(seen_err > seen_ok, "bruit trop “sage”: {seen_ok} ok / {seen_err} err");
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let expr = somme_balancee("1/2", 800);
    let v = eval_expression(&expr, &Registre::standard(), &Config::default())
        .unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(v, 400.0);
}
