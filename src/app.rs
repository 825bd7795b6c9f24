// src/app.rs
//
// Résolveur d’expressions — module App (racine)
// ---------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs + format.rs)
// - Ré-exporter AppCalc (pour main.rs)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// La gestion Enter est faite dans vue.rs, quand le champ a le focus.

pub mod etat;
pub mod format;
pub mod vue;

pub use etat::AppCalc;

use eframe::egui;

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC = effacer seulement l’entrée (comme bouton "C").
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            self.clear_entree();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
