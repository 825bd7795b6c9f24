// src/noyau/rpn.rs
//
// Shunting-yard : jetons infixes -> RPN (postfixe).
//
// Règles:
// - Nombre : sortie directe.
// - Opérateur op1 : tant que le sommet est un opérateur op2 plus prioritaire,
//   ou de même priorité avec op1 associatif à gauche, op2 passe en sortie.
//   (^ associatif à droite reste donc sur la pile : 2^3^2 = 2^(3^2))
// - Fonction / '(' : empilés.
// - ')' : dépile jusqu’à '(' (jetée), puis sort la fonction éventuelle
//   qui la précède : la fonction suit immédiatement son argument.

use std::cmp::Ordering;
use std::collections::VecDeque;

use super::erreur::{Erreur, Resultat};
use super::jetons::{Contexte, Jeton, TypeJeton};
use super::registre::Registre;

/// Faut-il sortir `sommet` avant d’empiler `entrant` ?
fn doit_depiler(registre: &Registre, sommet: &Jeton, entrant: &str) -> Resultat<bool> {
    if sommet.genre != TypeJeton::Operateur {
        return Ok(false);
    }
    let ordre = registre.compare(&sommet.lexeme, entrant)?;
    Ok(ordre == Ordering::Greater
        || (ordre == Ordering::Equal && registre.is_left_associative(entrant)?))
}

/// Convertit une suite de jetons (éventuellement paresseuse) en RPN.
///
/// Exemple:
///   jetons: sqrt ( 9 ) + 2 * 3
///   rpn:    9 sqrt 2 3 * +
pub fn to_rpn<I>(jetons: I, registre: &Registre) -> Resultat<VecDeque<Jeton>>
where
    I: IntoIterator<Item = Resultat<Jeton>>,
{
    let mut out: VecDeque<Jeton> = VecDeque::new();
    let mut pile: Vec<Jeton> = Vec::new();

    for jeton in jetons {
        let jeton = jeton?;

        match jeton.genre {
            TypeJeton::Nombre => out.push_back(jeton),

            TypeJeton::Operateur => {
                while let Some(sommet) = pile.last() {
                    if !doit_depiler(registre, sommet, &jeton.lexeme)? {
                        break;
                    }
                    out.extend(pile.pop());
                }
                pile.push(jeton);
            }

            TypeJeton::Fonction | TypeJeton::Ouvrante => pile.push(jeton),

            TypeJeton::Fermante => {
                loop {
                    match pile.pop() {
                        Some(j) if j.genre == TypeJeton::Ouvrante => break,
                        Some(j) => out.push_back(j),
                        None => {
                            return Err(Erreur::ParenthesesDesequilibrees(
                                "')' sans '(' correspondante",
                            ))
                        }
                    }
                }

                if pile.last().is_some_and(|j| j.genre == TypeJeton::Fonction) {
                    out.extend(pile.pop());
                }
            }

            TypeJeton::Inconnu => {
                return Err(Erreur::JetonInattendu {
                    lexeme: jeton.lexeme,
                    contexte: Contexte::Inconnu,
                })
            }
        }
    }

    // vide la pile
    while let Some(j) = pile.pop() {
        if j.genre == TypeJeton::Ouvrante {
            return Err(Erreur::ParenthesesDesequilibrees("'(' non fermée"));
        }
        out.push_back(j);
    }

    tracing::debug!(rpn = out.len(), "conversion RPN terminée");
    Ok(out)
}
