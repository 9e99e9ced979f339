use crate::PaintApp;
use crate::renderer::device_size;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let pixels_per_point = ctx.pixels_per_point();

            let canvas = app.controller.canvas_mut();
            canvas.set_display_density(pixels_per_point);
            let [width, height] = device_size(rect, pixels_per_point);
            if canvas.size() != [width, height] {
                log::debug!("Canvas resized to {}x{}", width, height);
                canvas.resize(width, height);
            }

            app.input_handler.set_canvas_rect(rect, pixels_per_point);
            let mut needs_repaint = false;
            for event in app.input_handler.process_input(ctx) {
                needs_repaint |= app.controller.handle_input(&event);
            }
            if needs_repaint {
                ctx.request_repaint();
            }

            app.renderer
                .render(ctx, &painter, rect, app.controller.canvas());
        });
}
