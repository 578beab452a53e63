use crate::app::{ConverterApp, Dialog};
use crate::ui::{pick_input_file, pick_output_dir};
use eframe::egui;

pub fn render_main_window(app: &mut ConverterApp, ctx: &egui::Context) {
    // Top menu bar
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        render_menu_bar(app, ui);
    });

    // Status bar at bottom
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        render_status_bar(app, ui);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        render_file_selection(app, ui);
        ui.add_space(8.0);
        render_conversion_section(app, ui);
        ui.add_space(8.0);
        render_log(app, ui);
    });

    render_dialog(app, ctx);
}

fn render_menu_bar(app: &mut ConverterApp, ui: &mut egui::Ui) {
    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            let idle = !app.is_converting();
            if ui.add_enabled(idle, egui::Button::new("Open File...")).clicked() {
                if let Some(path) = pick_input_file() {
                    app.select_file(path);
                }
                ui.close_menu();
            }
            if ui.button("Output Folder...").clicked() {
                if let Some(dir) = pick_output_dir(&app.settings.output_dir) {
                    app.set_output_dir(dir);
                }
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Exit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.menu_button("Log", |ui| {
            if ui.button("Clear").clicked() {
                app.log.clear();
                ui.close_menu();
            }
        });
    });
}

fn render_status_bar(app: &ConverterApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label(&app.task.message);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(app.task.state.name());
        });
    });
}

fn render_file_selection(app: &mut ConverterApp, ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.strong("File Selection");

        ui.horizontal(|ui| {
            let label = app
                .input_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "No file selected".to_string());
            ui.label(label);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!app.is_converting(), egui::Button::new("Browse..."))
                    .clicked()
                {
                    if let Some(path) = pick_input_file() {
                        app.select_file(path);
                    }
                }
            });
        });

        ui.horizontal(|ui| {
            ui.label("Convert to:");
            let formats = app.available_formats;
            let selected = app.selected_format.clone().unwrap_or_else(|| "-".to_string());
            ui.add_enabled_ui(!formats.is_empty() && !app.is_converting(), |ui| {
                egui::ComboBox::from_id_salt("target_format")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for format in formats {
                            ui.selectable_value(
                                &mut app.selected_format,
                                Some(format.to_string()),
                                *format,
                            );
                        }
                    });
            });
        });
    });
}

fn render_conversion_section(app: &mut ConverterApp, ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.strong("Conversion");

        match app.output_preview() {
            Some(path) => {
                ui.label(format!("Output will be saved to:\n{}", path.display()));
            }
            None => {
                ui.weak(format!(
                    "Output folder: {}",
                    app.settings.output_dir.display()
                ));
            }
        }

        ui.horizontal(|ui| {
            let label = if app.is_converting() { "Converting..." } else { "Convert" };
            if ui
                .add_enabled(app.can_convert(), egui::Button::new(label))
                .clicked()
            {
                app.start_conversion();
            }
            if app.task.is_running() {
                ui.spinner();
            }
        });

        ui.add(egui::ProgressBar::new(app.task.progress).show_percentage());
    });
}

fn render_log(app: &ConverterApp, ui: &mut egui::Ui) {
    ui.strong("Log");
    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &app.log {
                    ui.monospace(line);
                }
            });
    });
}

enum DialogAction {
    None,
    Close,
    OpenOutput,
}

fn render_dialog(app: &mut ConverterApp, ctx: &egui::Context) {
    let Some(dialog) = app.dialog.clone() else {
        return;
    };

    let mut action = DialogAction::None;
    let (title, text) = match &dialog {
        Dialog::UnsupportedFile(msg) => ("Unsupported File", msg.clone()),
        Dialog::Success(_) => (
            "Success",
            "Conversion completed successfully!\nWould you like to open the output file?"
                .to_string(),
        ),
        Dialog::Failed(msg) => ("Conversion Failed", format!("An error occurred:\n{}", msg)),
    };

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(text);
            ui.add_space(8.0);
            ui.horizontal(|ui| match &dialog {
                Dialog::Success(_) => {
                    if ui.button("Yes").clicked() {
                        action = DialogAction::OpenOutput;
                    }
                    if ui.button("No").clicked() {
                        action = DialogAction::Close;
                    }
                }
                _ => {
                    if ui.button("OK").clicked() {
                        action = DialogAction::Close;
                    }
                }
            });
        });

    match action {
        DialogAction::None => {}
        DialogAction::Close => app.dialog = None,
        DialogAction::OpenOutput => {
            if let Dialog::Success(path) = dialog {
                app.open_output(&path);
            }
            app.dialog = None;
        }
    }
}
