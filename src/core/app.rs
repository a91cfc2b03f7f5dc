//! Application entry point behind the command line

use std::io::Read;

use anyhow::{Context, Result};
use bevy::prelude::*;

use crate::core::cli::{CliArgs, CliCommand};
use crate::core::errors::ZoneContext;
use crate::core::settings::EditorSettings;
use crate::editing::{PreviewShape, ZoneEditor};
use crate::geometry::{projection_to_world, world_to_projection, WorldPoint};
use crate::io::CoordinateImporter;

/// Run one command and return what should be printed.
///
/// `stdin` is only read by `convert` when no input file was given.
pub fn run(cli_args: &CliArgs, stdin: impl Read) -> Result<String> {
    cli_args.validate().map_err(anyhow::Error::msg)?;
    let settings = load_settings(cli_args)?;

    match &cli_args.command {
        CliCommand::Convert { input, format } => {
            let text = match input {
                Some(path) => std::fs::read_to_string(path).with_file_context("read", path)?,
                None => read_all(stdin)?,
            };
            let imported = CoordinateImporter::new().parse(&text);
            let mut editor = ZoneEditor::new(settings);
            let id = editor
                .import_zone(imported)
                .context("Could not parse coordinates")?;
            let zone = editor
                .zone(id)
                .context("imported zone went missing")?;
            info!("Converted {} points to {}", zone.points.len(), format.label());
            Ok(format.render(zone))
        }
        CliCommand::Template {
            shape,
            x,
            y,
            size,
            rotation,
            format,
        } => {
            let size = size.unwrap_or(settings.default_template_size);
            let mut preview = PreviewShape::new(*shape, WorldPoint::new(*x, *y), size);
            preview.set_rotation(*rotation);
            let mut editor = ZoneEditor::new(settings);
            let id = editor.create_zone_from_template(&preview);
            let zone = editor
                .zone(id)
                .context("template zone went missing")?;
            Ok(format.render(zone))
        }
        CliCommand::Project { x, y } => {
            let map = world_to_projection(*x, *y);
            serde_json::to_string_pretty(&map).context("Failed to encode map point")
        }
        CliCommand::Unproject { lat, lng } => {
            let world = projection_to_world(*lat, *lng).rounded();
            serde_json::to_string_pretty(&world).context("Failed to encode world point")
        }
    }
}

fn load_settings(cli_args: &CliArgs) -> Result<EditorSettings> {
    match &cli_args.settings {
        Some(path) => EditorSettings::load(path),
        None => Ok(EditorSettings::default()),
    }
}

fn read_all(mut reader: impl Read) -> Result<String> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("Failed to read coordinates from stdin")?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn args(argv: &[&str]) -> CliArgs {
        let mut full = vec!["zonecreator"];
        full.extend_from_slice(argv);
        CliArgs::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_convert_from_stdin() {
        let input = "local points = {\n  vector2(10.0, 20.0),\n  vector2(30.0, 20.0),\n  vector2(30.0, 40.0),\n}";
        let output = run(&args(&["convert", "--format", "vec2"]), input.as_bytes()).unwrap();
        assert_eq!(
            output,
            "vector2(10, 20),\nvector2(30, 20),\nvector2(30, 40)"
        );
    }

    #[test]
    fn test_convert_needs_three_points() {
        let err = run(&args(&["convert"]), "vector2(1, 2)".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Could not parse coordinates"));
    }

    #[test]
    fn test_convert_from_file_with_settings() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("zone.lua");
        std::fs::write(&input, "{x = 0, y = 0}, {x = 10, y = 0}, {x = 10, y = 10}").unwrap();
        let settings = dir.path().join("settings.json");
        let mut file = std::fs::File::create(&settings).unwrap();
        write!(file, r#"{{"import_default_thickness": 12}}"#).unwrap();

        let output = run(
            &args(&[
                "--settings",
                settings.to_str().unwrap(),
                "convert",
                "--input",
                input.to_str().unwrap(),
                "--format",
                "oxlib",
            ]),
            std::io::empty(),
        )
        .unwrap();
        assert!(output.contains("thickness = 12"));
    }

    #[test]
    fn test_template_rectangle() {
        let output = run(
            &args(&["template", "rectangle", "--x", "100", "--y", "200", "--format", "vec2"]),
            std::io::empty(),
        )
        .unwrap();
        assert_eq!(
            output,
            "vector2(50, 150),\nvector2(150, 150),\nvector2(150, 250),\nvector2(50, 250)"
        );
    }

    #[test]
    fn test_project_and_back() {
        let json = run(&args(&["project", "--x", "0", "--y", "0"]), std::io::empty()).unwrap();
        let map: serde_json::Value = serde_json::from_str(&json).unwrap();
        let lat = map["lat"].as_f64().unwrap();
        let lng = map["lng"].as_f64().unwrap();

        let back = run(
            &args(&["unproject", "--lat", &lat.to_string(), "--lng", &lng.to_string()]),
            std::io::empty(),
        )
        .unwrap();
        let world: serde_json::Value = serde_json::from_str(&back).unwrap();
        assert_eq!(world["x"].as_f64(), Some(0.0));
        assert_eq!(world["y"].as_f64(), Some(0.0));
    }
}
