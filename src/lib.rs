//! Résolveur d’expressions arithmétiques : jetons -> RPN -> valeur (f64).
//!
//! ```
//! use resolveur_expr::noyau::{eval_expression, Config, Registre};
//!
//! let r = Registre::standard();
//! let v = eval_expression("2 * 3 + 2 ^ 2 * 4", &r, &Config::default()).unwrap();
//! assert_eq!(v, 22.0);
//! ```

pub mod noyau;
