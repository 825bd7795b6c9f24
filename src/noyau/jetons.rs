// src/noyau/jetons.rs
//
// Tokenisation en deux temps :
// 1) Scanner : texte -> lexèmes atomiques (chiffre, séparateur, exposant, signe,
//    parenthèses, noms du registre). Les blancs séparent, ne sont jamais des jetons.
// 2) Machine à contextes : le sens d’un signe / chiffre / séparateur dépend du
//    dernier jeton émis. Les fragments de nombre s’accumulent jusqu’au flush.
//
// Le flux est paresseux (Iterator) et s’arrête définitivement à la première erreur.

use std::collections::VecDeque;
use std::fmt;

use super::config::Config;
use super::erreur::{Erreur, Resultat};
use super::registre::{Nom, Registre};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeJeton {
    Nombre,
    Operateur,
    Fonction,
    Ouvrante,
    Fermante,
    Inconnu,
}

/// Jeton = (genre, lexème). Pour un Nombre, le lexème est normalisé
/// (séparateur configuré, signe de tête seulement si négatif).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jeton {
    pub genre: TypeJeton,
    pub lexeme: String,
}

impl Jeton {
    pub fn new(genre: TypeJeton, lexeme: impl Into<String>) -> Self {
        Self {
            genre,
            lexeme: lexeme.into(),
        }
    }

    pub fn nombre(lexeme: impl Into<String>) -> Self {
        Self::new(TypeJeton::Nombre, lexeme)
    }

    pub fn operateur(lexeme: impl Into<String>) -> Self {
        Self::new(TypeJeton::Operateur, lexeme)
    }

    pub fn fonction(lexeme: impl Into<String>) -> Self {
        Self::new(TypeJeton::Fonction, lexeme)
    }

    pub fn ouvrante() -> Self {
        Self::new(TypeJeton::Ouvrante, "(")
    }

    pub fn fermante() -> Self {
        Self::new(TypeJeton::Fermante, ")")
    }
}

impl fmt::Display for Jeton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexeme)
    }
}

/// Dernier jeton “engagé” (ou accumulation de nombre en cours).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contexte {
    Inconnu,
    Nombre,
    Operateur,
    Ouvrante,
    Fermante,
    Fonction,
}

impl fmt::Display for Contexte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Contexte::Inconnu => "début",
            Contexte::Nombre => "nombre",
            Contexte::Operateur => "opérateur",
            Contexte::Ouvrante => "parenthèse ouvrante",
            Contexte::Fermante => "parenthèse fermante",
            Contexte::Fonction => "fonction",
        };
        f.write_str(s)
    }
}

/* ------------------------ Lexèmes atomiques ------------------------ */

#[derive(Clone, Debug, PartialEq)]
enum Lexeme {
    Chiffre(char),
    Separateur(char),
    Exposant(char),
    Signe(char),
    Ouvrante,
    Fermante,
    Operation { nom: String, genre: TypeJeton },
}

impl Lexeme {
    fn texte(&self) -> String {
        match self {
            Lexeme::Chiffre(c) | Lexeme::Separateur(c) | Lexeme::Exposant(c) | Lexeme::Signe(c) => {
                c.to_string()
            }
            Lexeme::Ouvrante => "(".into(),
            Lexeme::Fermante => ")".into(),
            Lexeme::Operation { nom, .. } => nom.clone(),
        }
    }
}

struct Scanner<'t> {
    registre: &'t Registre,
    // noms symboliques, du plus long au plus court
    symboles: &'t [Vec<char>],
    chars: Vec<char>,
    pos: usize,
}

impl Scanner<'_> {
    fn suivant(&mut self) -> Option<Resultat<Lexeme>> {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }

        let debut = self.pos;
        let c = *self.chars.get(debut)?;

        let lex = match c {
            '(' => Lexeme::Ouvrante,
            ')' => Lexeme::Fermante,
            '.' | ',' => Lexeme::Separateur(c),
            _ if c.is_ascii_digit() => Lexeme::Chiffre(c),
            _ if c.is_alphabetic() => return Some(self.mot(debut)),
            _ => return Some(self.symbole(debut)),
        };

        self.pos += 1;
        Some(Ok(lex))
    }

    /// Suite maximale de lettres : nom du registre ou marqueur d’exposant.
    fn mot(&mut self, debut: usize) -> Resultat<Lexeme> {
        while self.pos < self.chars.len() && self.chars[self.pos].is_alphabetic() {
            self.pos += 1;
        }
        let mot: String = self.chars[debut..self.pos].iter().collect();

        if let Ok(d) = self.registre.lookup(&mot) {
            return Ok(Lexeme::Operation {
                nom: mot,
                genre: d.type_jeton(),
            });
        }
        if mot == "e" || mot == "E" {
            return Ok(Lexeme::Exposant(self.chars[debut]));
        }
        Err(Erreur::JetonInconnu {
            lexeme: mot,
            position: debut,
        })
    }

    /// Plus longue correspondance parmi les noms symboliques.
    fn symbole(&mut self, debut: usize) -> Resultat<Lexeme> {
        let reste = &self.chars[debut..];
        let c = reste[0];

        let trouve = self.symboles.iter().find(|s| reste.starts_with(s.as_slice()));

        match trouve {
            Some(s) if s.len() == 1 && (c == '+' || c == '-') => {
                self.pos += 1;
                Ok(Lexeme::Signe(c))
            }
            Some(s) => {
                self.pos += s.len();
                let nom: String = s.iter().collect();
                let genre = self.registre.lookup(&nom)?.type_jeton();
                Ok(Lexeme::Operation { nom, genre })
            }
            None if c == '+' || c == '-' => {
                self.pos += 1;
                Ok(Lexeme::Signe(c))
            }
            None => Err(Erreur::JetonInconnu {
                lexeme: c.to_string(),
                position: debut,
            }),
        }
    }
}

/* ------------------------ Accumulateur de nombre ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Parite {
    Positive,
    Negative,
}

impl Parite {
    fn inverse(self) -> Self {
        match self {
            Parite::Positive => Parite::Negative,
            Parite::Negative => Parite::Positive,
        }
    }
}

#[derive(Clone, Debug)]
struct Exposant {
    marqueur: char,
    signe: Option<char>,
    chiffres: String,
}

/// Fragments du littéral en cours. Le signe de tête est une parité :
/// chaque '-' supplémentaire la retourne.
#[derive(Clone, Debug, Default)]
struct Accumulateur {
    signe: Option<Parite>,
    mantisse: String,
    separateur: bool,
    exposant: Option<Exposant>,
}

impl Accumulateur {
    fn signes_seuls(&self) -> bool {
        self.signe.is_some() && self.mantisse.is_empty()
    }

    fn negatif(&self) -> bool {
        self.signe == Some(Parite::Negative)
    }

    /// Juste après 'e' : un signe appartient à l’exposant.
    fn attend_signe_exposant(&self) -> bool {
        matches!(&self.exposant, Some(e) if e.signe.is_none() && e.chiffres.is_empty())
    }

    fn texte(&self) -> String {
        let mut s = String::new();
        match self.signe {
            Some(Parite::Negative) => s.push('-'),
            Some(Parite::Positive) => s.push('+'),
            None => {}
        }
        s.push_str(&self.mantisse);
        if let Some(e) = &self.exposant {
            s.push(e.marqueur);
            s.extend(e.signe);
            s.push_str(&e.chiffres);
        }
        s
    }

    fn ajouter_chiffre(&mut self, c: char) {
        match &mut self.exposant {
            Some(e) => e.chiffres.push(c),
            None => self.mantisse.push(c),
        }
    }

    fn ajouter_separateur(&mut self, separateur: char) -> Result<(), &'static str> {
        if self.exposant.is_some() {
            return Err("séparateur dans l’exposant");
        }
        if self.separateur {
            return Err("second séparateur décimal");
        }
        if self.mantisse.is_empty() {
            return Err("séparateur sans chiffre avant");
        }
        self.separateur = true;
        self.mantisse.push(separateur);
        Ok(())
    }

    fn ajouter_exposant(&mut self, marqueur: char) -> Result<(), &'static str> {
        if self.exposant.is_some() {
            return Err("second exposant");
        }
        let apres_chiffre = self
            .mantisse
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit());
        if !apres_chiffre {
            return Err("exposant sans chiffre avant");
        }
        self.exposant = Some(Exposant {
            marqueur,
            signe: None,
            chiffres: String::new(),
        });
        Ok(())
    }

    /// Flush : lexème normalisé, puis remise à zéro.
    fn vider(&mut self) -> Result<String, &'static str> {
        let accu = std::mem::take(self);

        if !accu.mantisse.chars().any(|c| c.is_ascii_digit()) {
            return Err("nombre sans chiffre");
        }

        let mut s = String::new();
        if accu.negatif() {
            s.push('-');
        }
        s.push_str(&accu.mantisse);

        if let Some(e) = accu.exposant {
            if e.chiffres.is_empty() {
                return Err("exposant sans chiffre");
            }
            s.push(e.marqueur);
            s.extend(e.signe);
            s.push_str(&e.chiffres);
        }
        Ok(s)
    }
}

/* ------------------------ Tokenizer ------------------------ */

pub struct Tokenizer<'r> {
    registre: &'r Registre,
    separateur: char,
    puissance_negative: Option<Nom>,
    symboles: Vec<Vec<char>>,
}

impl<'r> Tokenizer<'r> {
    pub fn new(registre: &'r Registre, config: &Config) -> Self {
        let mut symboles: Vec<Vec<char>> = registre
            .names()
            .filter(|n| n.est_symbole())
            .map(|n| n.as_str().chars().collect())
            .collect();
        symboles.sort_by(|a, b| b.len().cmp(&a.len()));

        Self {
            registre,
            separateur: config.separateur_decimal(),
            puissance_negative: config.puissance_negative().map(Nom::new),
            symboles,
        }
    }

    /// Flux de base (sans post-filtre). Chaque appel repart d’un état neuf.
    pub fn tokenize(&self, texte: &str) -> Jetons<'_> {
        Jetons {
            scanner: Scanner {
                registre: self.registre,
                symboles: &self.symboles,
                chars: texte.chars().collect(),
                pos: 0,
            },
            separateur: self.separateur,
            contexte: Contexte::Inconnu,
            accu: Accumulateur::default(),
            derniere_fonction: String::new(),
            sortie: VecDeque::new(),
            emis: 0,
            termine: false,
        }
    }

    /// Flux configuré : base + réécriture “puissance négative” si activée.
    pub fn stream<'s>(&'s self, texte: &str) -> Box<dyn Iterator<Item = Resultat<Jeton>> + 's> {
        let base = self.tokenize(texte);
        match &self.puissance_negative {
            Some(op) => Box::new(NegativePower::new(base, op.clone())),
            None => Box::new(base),
        }
    }
}

/// Tokenisation complète (forme non paresseuse).
pub fn tokenize(texte: &str, registre: &Registre, config: &Config) -> Resultat<Vec<Jeton>> {
    Tokenizer::new(registre, config).stream(texte).collect()
}

pub struct Jetons<'t> {
    scanner: Scanner<'t>,
    separateur: char,
    contexte: Contexte,
    accu: Accumulateur,
    derniere_fonction: String,
    sortie: VecDeque<Jeton>,
    emis: usize,
    termine: bool,
}

impl Jetons<'_> {
    fn emettre(&mut self, jeton: Jeton) {
        self.sortie.push_back(jeton);
    }

    fn erreur_litteral(&self, suffixe: &str, raison: &'static str) -> Erreur {
        Erreur::Tokenisation {
            lexeme: format!("{}{suffixe}", self.accu.texte()),
            contexte: self.contexte,
            raison,
        }
    }

    fn emettre_nombre(&mut self) -> Resultat<()> {
        let texte = self.accu.texte();
        let lexeme = self.accu.vider().map_err(|raison| Erreur::Tokenisation {
            lexeme: texte,
            contexte: Contexte::Nombre,
            raison,
        })?;
        self.emettre(Jeton::nombre(lexeme));
        Ok(())
    }

    fn traiter(&mut self, lex: Lexeme) -> Resultat<()> {
        match self.contexte {
            Contexte::Inconnu | Contexte::Ouvrante | Contexte::Operateur => {
                self.attendre_operande(lex)
            }
            Contexte::Nombre => self.dans_nombre(lex),
            Contexte::Fermante => self.apres_fermante(lex),
            Contexte::Fonction => self.apres_fonction(lex),
        }
    }

    /// Début, après '(' ou après un opérateur : un opérande est attendu.
    fn attendre_operande(&mut self, lex: Lexeme) -> Resultat<()> {
        match lex {
            Lexeme::Chiffre(c) => {
                self.accu.mantisse.push(c);
                self.contexte = Contexte::Nombre;
            }
            Lexeme::Signe(c) => {
                self.accu.signe = Some(if c == '-' {
                    Parite::Negative
                } else {
                    Parite::Positive
                });
                self.contexte = Contexte::Nombre;
            }
            Lexeme::Separateur(_) | Lexeme::Exposant(_) => {
                return Err(Erreur::Tokenisation {
                    lexeme: lex.texte(),
                    contexte: self.contexte,
                    raison: "un nombre ne commence ni par un séparateur ni par un exposant",
                });
            }
            Lexeme::Ouvrante => {
                self.emettre(Jeton::ouvrante());
                self.contexte = Contexte::Ouvrante;
            }
            Lexeme::Operation {
                nom,
                genre: TypeJeton::Fonction,
            } => self.ouvrir_fonction(nom),
            Lexeme::Operation { .. } | Lexeme::Fermante => {
                return Err(Erreur::JetonInattendu {
                    lexeme: lex.texte(),
                    contexte: self.contexte,
                });
            }
        }
        Ok(())
    }

    fn dans_nombre(&mut self, lex: Lexeme) -> Resultat<()> {
        match lex {
            Lexeme::Chiffre(c) => self.accu.ajouter_chiffre(c),
            Lexeme::Separateur(s) => {
                let sep = self.separateur;
                self.accu
                    .ajouter_separateur(sep)
                    .map_err(|raison| self.erreur_litteral(&s.to_string(), raison))?;
            }
            Lexeme::Exposant(m) => {
                self.accu
                    .ajouter_exposant(m)
                    .map_err(|raison| self.erreur_litteral(&m.to_string(), raison))?;
            }
            Lexeme::Signe(c) => {
                if self.accu.attend_signe_exposant() {
                    if let Some(e) = &mut self.accu.exposant {
                        e.signe = Some(c);
                    }
                } else if self.accu.signes_seuls() {
                    // --5 => +5, ---5 => -5 ; '+' répété refusé
                    if c != '-' {
                        return Err(self.erreur_litteral("+", "'+' après un signe"));
                    }
                    self.accu.signe = self.accu.signe.map(Parite::inverse);
                } else {
                    self.emettre_nombre()?;
                    self.emettre(Jeton::operateur(c.to_string()));
                    self.contexte = Contexte::Operateur;
                }
            }
            Lexeme::Operation {
                nom,
                genre: TypeJeton::Fonction,
            } => {
                self.resoudre_signes(&nom)?;
                self.ouvrir_fonction(nom);
            }
            Lexeme::Operation { nom, .. } => {
                self.emettre_nombre()?;
                self.emettre(Jeton::operateur(nom));
                self.contexte = Contexte::Operateur;
            }
            Lexeme::Fermante => {
                self.emettre_nombre()?;
                self.emettre(Jeton::fermante());
                self.contexte = Contexte::Fermante;
            }
            Lexeme::Ouvrante => {
                self.resoudre_signes("(")?;
                self.emettre(Jeton::ouvrante());
                self.contexte = Contexte::Ouvrante;
            }
        }
        Ok(())
    }

    /// Multiplication implicite : signes seuls devant '(' ou une fonction.
    /// Parité négative => `-1 *` est inséré avant.
    fn resoudre_signes(&mut self, suivant: &str) -> Resultat<()> {
        if !self.accu.signes_seuls() {
            return Err(self.erreur_litteral(suivant, "multiplication implicite non supportée"));
        }
        let negatif = self.accu.negatif();
        self.accu = Accumulateur::default();
        if negatif {
            self.emettre(Jeton::nombre("-1"));
            self.emettre(Jeton::operateur("*"));
        }
        Ok(())
    }

    fn ouvrir_fonction(&mut self, nom: String) {
        self.derniere_fonction = nom.clone();
        self.emettre(Jeton::fonction(nom));
        self.contexte = Contexte::Fonction;
    }

    fn apres_fermante(&mut self, lex: Lexeme) -> Resultat<()> {
        match lex {
            Lexeme::Signe(c) => {
                self.emettre(Jeton::operateur(c.to_string()));
                self.contexte = Contexte::Operateur;
            }
            Lexeme::Operation {
                nom,
                genre: TypeJeton::Operateur,
            } => {
                self.emettre(Jeton::operateur(nom));
                self.contexte = Contexte::Operateur;
            }
            Lexeme::Fermante => self.emettre(Jeton::fermante()),
            // Pas de multiplication implicite après ')' : "(2)(3)", "(1)2" ou "(1)sin(0)"
            // laisseraient deux valeurs sur la pile. On refuse ici, avec le lexème
            // et le contexte fautifs, plutôt qu’un PostfixeMalforme sans position.
            _ => {
                return Err(Erreur::JetonInattendu {
                    lexeme: lex.texte(),
                    contexte: Contexte::Fermante,
                });
            }
        }
        Ok(())
    }

    fn apres_fonction(&mut self, lex: Lexeme) -> Resultat<()> {
        if lex != Lexeme::Ouvrante {
            return Err(Erreur::AppelFonctionMalforme {
                fonction: self.derniere_fonction.clone(),
                suivant: lex.texte(),
            });
        }
        self.emettre(Jeton::ouvrante());
        self.contexte = Contexte::Ouvrante;
        Ok(())
    }

    fn terminer(&mut self) -> Resultat<()> {
        match self.contexte {
            Contexte::Nombre => self.emettre_nombre(),
            Contexte::Fonction => Err(Erreur::AppelFonctionMalforme {
                fonction: self.derniere_fonction.clone(),
                suivant: "fin d’expression".into(),
            }),
            _ => Ok(()),
        }
    }
}

impl Iterator for Jetons<'_> {
    type Item = Resultat<Jeton>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(j) = self.sortie.pop_front() {
                tracing::trace!(genre = ?j.genre, lexeme = %j.lexeme, "jeton");
                self.emis += 1;
                return Some(Ok(j));
            }
            if self.termine {
                return None;
            }

            let etape = match self.scanner.suivant() {
                Some(Ok(lex)) => self.traiter(lex),
                Some(Err(e)) => Err(e),
                None => {
                    self.termine = true;
                    let fin = self.terminer();
                    if fin.is_ok() {
                        tracing::debug!(jetons = self.emis + self.sortie.len(), "tokenisation terminée");
                    }
                    fin
                }
            };

            if let Err(e) = etape {
                self.termine = true;
                self.sortie.clear();
                return Some(Err(e));
            }
        }
    }
}

/* ------------------------ Post-filtre “puissance négative” ------------------------ */

/// Réécrit `-a op` en `-1 * ( a ) op` (un jeton d’avance).
/// Avec `op` plus prioritaire que '*', `-2&2` vaut -(2&2) au lieu de (-2)&2.
pub struct NegativePower<I> {
    base: I,
    operateur: Nom,
    precedent: Option<Jeton>,
    sortie: VecDeque<Resultat<Jeton>>,
    fini: bool,
}

impl<I> NegativePower<I> {
    pub fn new(base: I, operateur: Nom) -> Self {
        Self {
            base,
            operateur,
            precedent: None,
            sortie: VecDeque::new(),
            fini: false,
        }
    }
}

impl<I> Iterator for NegativePower<I>
where
    I: Iterator<Item = Resultat<Jeton>>,
{
    type Item = Resultat<Jeton>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(j) = self.sortie.pop_front() {
                return Some(j);
            }
            if self.fini {
                return None;
            }

            match self.base.next() {
                Some(Ok(courant)) => {
                    match self.precedent.take() {
                        Some(p)
                            if p.genre == TypeJeton::Nombre
                                && p.lexeme.starts_with('-')
                                && courant.genre == TypeJeton::Operateur
                                && Nom::new(&courant.lexeme) == self.operateur =>
                        {
                            self.sortie.extend(
                                [
                                    Jeton::nombre("-1"),
                                    Jeton::operateur("*"),
                                    Jeton::ouvrante(),
                                    Jeton::nombre(&p.lexeme[1..]),
                                    Jeton::fermante(),
                                ]
                                .map(Ok),
                            );
                        }
                        Some(p) => self.sortie.push_back(Ok(p)),
                        None => {}
                    }
                    self.precedent = Some(courant);
                }
                Some(Err(e)) => {
                    self.sortie.extend(self.precedent.take().map(Ok));
                    self.sortie.push_back(Err(e));
                    self.fini = true;
                }
                None => {
                    self.sortie.extend(self.precedent.take().map(Ok));
                    self.fini = true;
                }
            }
        }
    }
}

/// Format utilitaire (démarche) : liste de jetons en texte.
pub fn format_jetons(jetons: &[Jeton]) -> String {
    jetons
        .iter()
        .map(|j| j.lexeme.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
