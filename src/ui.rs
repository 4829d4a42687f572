use egui::Context;

use crate::controller::VelocityCommand;
use crate::model::GameScene;

/// Raw egui input for a frame drawn at `width` x `height` physical pixels
pub fn raw_input(width: u32, height: u32, dpr: f32, now_ms: f64) -> egui::RawInput {
    let dpr = if dpr > 0.0 { dpr } else { 1.0 };
    let mut raw_input = egui::RawInput::default();
    raw_input.time = Some(now_ms / 1000.0);
    raw_input.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::new(0.0, 0.0),
        egui::vec2(width as f32 / dpr, height as f32 / dpr),
    ));
    raw_input
}

/// Build the complete UI and return egui output
pub fn build_ui(egui_ctx: &Context, raw_input: egui::RawInput, scene: &GameScene, dt: f32) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_debug_window(ctx, scene, dt);
        draw_controls(ctx);
    })
}

fn velocity_label(command: VelocityCommand) -> String {
    match command {
        VelocityCommand::Vertical(vy) => format!("vy {vy:+.0}"),
        VelocityCommand::Stop => "stopped".to_string(),
    }
}

fn draw_debug_window(ctx: &Context, scene: &GameScene, dt: f32) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("FPS: {:.0}", if dt > 0.0 { 1.0 / dt } else { 0.0 }))
                    .small(),
            );
            ui.label(egui::RichText::new(format!("Clock: {:.0} ms", scene.now_ms())).small());
            ui.label(
                egui::RichText::new(format!(
                    "Player y: {:.0} ({:.0}..{:.0})",
                    scene.player_y(),
                    scene.bounds.upper,
                    scene.bounds.lower
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("Intent: {:?}", scene.intent)).small());
            ui.label(egui::RichText::new(format!("Velocity: {}", velocity_label(scene.last_command))).small());
            ui.label(
                egui::RichText::new(format!(
                    "Obstacles: {} out, {} waiting",
                    scene.obstacles_spawned(),
                    scene.obstacles_pending()
                ))
                .small(),
            );
            if let Some(next) = scene.next_spawn_ms() {
                ui.label(egui::RichText::new(format!("Next spawn at: {next:.0} ms")).small());
            }
            ui.label(egui::RichText::new(format!("Input priority: {:?}", scene.resolver().priority)).small());
        });
}

fn draw_controls(ctx: &Context) {
    egui::Area::new(egui::Id::new("controls"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -8.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new("Swipe or hold Up / Down to swim")
                    .small()
                    .color(egui::Color32::WHITE),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Level;
    use crate::model::Assets;

    #[test]
    fn test_raw_input_uses_logical_points() {
        let input = raw_input(1920, 1080, 2.0, 1500.0);
        assert_eq!(input.time, Some(1.5));
        let rect = input.screen_rect.unwrap();
        assert_eq!(rect.width(), 960.0);
        assert_eq!(rect.height(), 540.0);
    }

    #[test]
    fn test_velocity_label() {
        assert_eq!(velocity_label(VelocityCommand::Vertical(-25.0)), "vy -25");
        assert_eq!(velocity_label(VelocityCommand::Stop), "stopped");
    }

    #[test]
    fn test_build_ui_produces_shapes() {
        let assets = Assets::preload().unwrap();
        let scene = GameScene::create(&assets, &Level::builtin().unwrap()).unwrap();
        let ctx = Context::default();
        // the first pass only measures new windows
        build_ui(&ctx, raw_input(1920, 1080, 1.0, 0.0), &scene, 1.0 / 60.0);
        let output = build_ui(&ctx, raw_input(1920, 1080, 1.0, 16.0), &scene, 1.0 / 60.0);
        assert!(!output.shapes.is_empty());
    }
}
