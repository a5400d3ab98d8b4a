use super::FisioUploader;
use crate::upload::UploadStatus;
use crate::utils::file_size::format_size;
use eframe::egui::{self, Color32, RichText};

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const ERROR_RED: Color32 = Color32::from_rgb(220, 50, 50);
const SUCCESS_GREEN: Color32 = Color32::from_rgb(0, 180, 0);

impl FisioUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Fisio Uploader");
                    ui.label(
                        RichText::new(format!("API: {}", self.config.api_url))
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });
                ui.add_space(15.0);

                self.render_health(ui);
                ui.add_space(10.0);
                self.render_sum(ui, ctx);
                ui.add_space(10.0);
                self.render_upload(ui, ctx);
                ui.add_space(10.0);
                self.render_items(ui, ctx);

                if let Some(error) = &self.state.error_message {
                    ui.add_space(10.0);
                    ui.colored_label(ERROR_RED, error);
                }
            });
        });
    }

    fn render_health(&self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(RichText::new("Status da API (GET /api/health)").strong());
            ui.label(RichText::new(&self.state.health).monospace());
        });
    }

    fn render_sum(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.group(|ui| {
            ui.label(RichText::new("Soma (GET /api/soma?a=&b=)").strong());
            ui.horizontal(|ui| {
                ui.label("A:");
                ui.add(egui::TextEdit::singleline(&mut self.state.sum_form.a).desired_width(80.0));
                ui.label("B:");
                ui.add(egui::TextEdit::singleline(&mut self.state.sum_form.b).desired_width(80.0));
            });
            if ui
                .add_enabled(!self.state.sum_pending, egui::Button::new("Somar"))
                .clicked()
            {
                self.request_sum(ctx);
            }
            if !self.state.sum_result.is_empty() {
                ui.label(&self.state.sum_result);
            }
        });
    }

    fn render_upload(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.group(|ui| {
            ui.label(RichText::new("Upload de Vídeo (POST /api/upload/video)").strong());
            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.label("Patient ID:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.state.upload_fields.patient_id)
                        .hint_text("ex: p123"),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Exercise ID:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.state.upload_fields.exercise_id)
                        .hint_text("ex: squat"),
                );
            });

            let submitting = self.state.workflow.is_submitting();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!submitting, egui::Button::new("📁 Selecionar vídeo"))
                    .clicked()
                {
                    self.pick_file();
                }

                let selected = self
                    .state
                    .workflow
                    .selected_file()
                    .map(|f| format!("{} ({}, {})", f.name, f.mime, format_size(f.size())));
                if let Some(selected) = selected {
                    ui.label(selected);
                    if ui.add_enabled(!submitting, egui::Button::new("✖")).clicked() {
                        self.state.workflow.clear_selection();
                    }
                }
            });

            if self.state.workflow.preview().is_some() && ui.button("▶ Abrir prévia").clicked() {
                self.open_preview();
            }

            ui.add_space(5.0);
            let button = egui::Button::new(if submitting { "⏳ Enviando..." } else { "📤 Enviar" })
                .min_size(egui::vec2(160.0, 32.0));
            if ui.add_enabled(self.state.workflow.can_submit(), button).clicked() {
                self.start_upload(ctx);
            }

            let status = self.state.workflow.status_text();
            if !status.is_empty() {
                let color = match self.state.workflow.status() {
                    UploadStatus::Failed(_) => ERROR_RED,
                    UploadStatus::Succeeded(_) => SUCCESS_GREEN,
                    _ => ui.visuals().text_color(),
                };
                ui.colored_label(color, status);
            }

            self.render_analysis(ui);
        });
    }

    fn render_analysis(&self, ui: &mut egui::Ui) {
        let Some(analysis) = self.state.workflow.analysis() else {
            return;
        };

        ui.add_space(8.0);
        ui.label(RichText::new("Feedback da Análise").strong());
        egui::ScrollArea::vertical()
            .id_source("analysis")
            .max_height(200.0)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .show(ui, |ui| {
                        ui.label(RichText::new(analysis.pretty()).monospace());
                    });
            });

        if let Some(repetitions) = analysis.repetitions() {
            ui.label(format!("Repetições detectadas: {}", repetitions));
        }
        if let Some(filename) = analysis.stored_filename() {
            ui.horizontal(|ui| {
                ui.label("Arquivo salvo:");
                ui.hyperlink_to(
                    RichText::new("Abrir").color(ACCENT),
                    self.config.uploads_url(filename),
                );
            });
        }
    }

    fn render_items(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.group(|ui| {
            ui.label(RichText::new("Criar item (POST /api/items)").strong());
            ui.horizontal(|ui| {
                ui.label("Nome:");
                ui.add(egui::TextEdit::singleline(&mut self.state.item_form.name).hint_text("Ex: Caderno"));
            });
            ui.horizontal(|ui| {
                ui.label("Quantidade:");
                ui.add(egui::DragValue::new(&mut self.state.item_form.quantity).clamp_range(1..=10_000));
            });

            let can_send = !self.state.item_pending && self.state.item_form.to_item().is_some();
            if ui
                .add_enabled(can_send, egui::Button::new("Enviar para API"))
                .clicked()
            {
                self.create_item(ctx);
            }

            ui.add_space(5.0);
            ui.label(RichText::new("Itens criados (apenas no cliente)").italics());
            for item in &self.state.items {
                ui.label(format!("• {} — {}", item.name, item.quantity));
            }
        });
    }
}
