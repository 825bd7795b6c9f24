//! Noyau — évaluation (pipeline réel)
//!
//! texte -> jetons (paresseux) -> RPN -> pile d’opérandes -> f64
//!
//! Le registre est partagé en lecture seule par les trois étapes.
//! Toute erreur arrête le pipeline : pas de valeur de repli ici
//! (ex: "1/0 => -∞" est une politique d’appelant, pas du noyau).

use super::config::Config;
use super::erreur::{Erreur, Resultat};
use super::jetons::{format_jetons, Contexte, Jeton, Tokenizer, TypeJeton};
use super::registre::{Operation, Registre};
use super::rpn::to_rpn;

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
}

/// Convertit un lexème Nombre (séparateur configuré) en f64.
fn lire_nombre(lexeme: &str, config: &Config) -> Resultat<f64> {
    let normalise = lexeme.replace(config.separateur_decimal(), ".");
    normalise
        .parse::<f64>()
        .map_err(|_| Erreur::FormatNombre(lexeme.to_string()))
}

fn depiler(pile: &mut Vec<f64>, operation: &str) -> Resultat<f64> {
    pile.pop().ok_or_else(|| Erreur::PileInsuffisante {
        operation: operation.to_string(),
    })
}

/// Évalue une suite postfixe. Suite vide => 0.
pub fn evaluate_rpn<I>(rpn: I, registre: &Registre, config: &Config) -> Resultat<f64>
where
    I: IntoIterator<Item = Jeton>,
{
    let mut pile: Vec<f64> = Vec::new();
    let mut vu = false;

    for jeton in rpn {
        vu = true;

        match jeton.genre {
            TypeJeton::Nombre => pile.push(lire_nombre(&jeton.lexeme, config)?),

            TypeJeton::Operateur | TypeJeton::Fonction => {
                let nom = jeton.lexeme.as_str();
                let resultat = match registre.lookup(nom)?.operation() {
                    Operation::Operateur { calcul, .. } => {
                        // b d’abord : a est l’opérande empilé en premier
                        let b = depiler(&mut pile, nom)?;
                        let a = depiler(&mut pile, nom)?;
                        calcul(a, b)
                    }
                    Operation::Fonction { calcul } => {
                        let x = depiler(&mut pile, nom)?;
                        calcul(x)
                    }
                };
                let valeur = resultat.map_err(|source| Erreur::Calcul {
                    operation: nom.to_string(),
                    source,
                })?;
                pile.push(valeur);
            }

            TypeJeton::Ouvrante | TypeJeton::Fermante | TypeJeton::Inconnu => {
                return Err(Erreur::JetonInattendu {
                    lexeme: jeton.lexeme,
                    contexte: Contexte::Inconnu,
                });
            }
        }
    }

    if !vu {
        return Ok(0.0);
    }

    match pile.as_slice() {
        [valeur] => {
            tracing::debug!(valeur = *valeur, "évaluation terminée");
            Ok(*valeur)
        }
        [] => Err(Erreur::PostfixeMalforme { restants: 0 }),
        _ => Err(Erreur::PostfixeMalforme {
            restants: pile.len(),
        }),
    }
}

/// API publique : évalue une expression.
pub fn eval_expression(texte: &str, registre: &Registre, config: &Config) -> Resultat<f64> {
    let tokenizer = Tokenizer::new(registre, config);
    let rpn = to_rpn(tokenizer.stream(texte), registre)?;
    evaluate_rpn(rpn, registre, config)
}

/// Comme `eval_expression`, avec la démarche (jetons + RPN) pour l’affichage.
pub fn eval_detaille(
    texte: &str,
    registre: &Registre,
    config: &Config,
) -> Resultat<(f64, Demarche)> {
    let tokenizer = Tokenizer::new(registre, config);

    // 1) Jetons (matérialisés pour la démarche)
    let jetons: Vec<Jeton> = tokenizer.stream(texte).collect::<Resultat<_>>()?;
    let jetons_txt = format_jetons(&jetons);

    // 2) RPN
    let mut rpn = to_rpn(jetons.into_iter().map(Ok), registre)?;
    let rpn_txt = format_jetons(rpn.make_contiguous());

    // 3) Valeur
    let valeur = evaluate_rpn(rpn, registre, config)?;

    Ok((
        valeur,
        Demarche {
            jetons: jetons_txt,
            rpn: rpn_txt,
        },
    ))
}
