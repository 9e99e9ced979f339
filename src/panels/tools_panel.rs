use egui::{Color32, vec2};

use crate::PaintApp;
use crate::brush::BrushSize;
use crate::color::parse_color;
use crate::controller::UiAction;

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    let mut actions = Vec::new();

    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Brush");
            ui.horizontal(|ui| {
                for size in BrushSize::ALL {
                    let selected = app.controller.brush_size() == size;
                    if ui.selectable_label(selected, size.label()).clicked() {
                        actions.push(UiAction::SetBrushSize(size));
                    }
                }
            });

            ui.separator();
            ui.heading("Color");
            ui.horizontal_wrapped(|ui| {
                for value in &app.settings.palette {
                    let Ok(fill) = parse_color(value) else {
                        continue;
                    };
                    let selected = app.controller.color().eq_ignore_ascii_case(value);
                    let stroke = if selected {
                        egui::Stroke::new(3.0, ui.visuals().selection.stroke.color)
                    } else {
                        egui::Stroke::new(1.0, Color32::GRAY)
                    };
                    let swatch = egui::Button::new("")
                        .fill(fill)
                        .stroke(stroke)
                        .min_size(vec2(24.0, 24.0));
                    if ui.add(swatch).on_hover_text(value.as_str()).clicked() {
                        actions.push(UiAction::SetColor(value.clone()));
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut app.color_input)
                        .hint_text("#RRGGBB or name")
                        .desired_width(100.0),
                );
                if ui.button("Apply").clicked() {
                    actions.push(UiAction::SetColor(app.color_input.trim().to_owned()));
                }
            });

            ui.separator();
            ui.horizontal(|ui| {
                let canvas = app.controller.canvas();
                if ui.add_enabled(canvas.can_undo(), egui::Button::new("Undo")).clicked() {
                    actions.push(UiAction::Undo);
                }
                if ui.add_enabled(canvas.can_redo(), egui::Button::new("Redo")).clicked() {
                    actions.push(UiAction::Redo);
                }
            });

            ui.separator();
            ui.label("Drop an image file on the window to set the background.");
            let has_background = app.controller.canvas().background().is_some();
            if ui
                .add_enabled(has_background, egui::Button::new("Clear background"))
                .clicked()
            {
                actions.push(UiAction::ClearBackground);
            }

            ui.separator();
            ui.horizontal(|ui| {
                let exporting = app.controller.is_exporting();
                if ui.add_enabled(!exporting, egui::Button::new("Save PNG")).clicked() {
                    actions.push(UiAction::Export);
                }
                if exporting {
                    ui.spinner();
                }
            });

            if let Some(status) = &app.status {
                ui.separator();
                ui.label(status.as_str());
            }
        });

    for action in actions {
        app.apply(action);
    }
}
