//! Command line arguments for the application

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::geometry::ShapeKind;
use crate::io::ExportFormat;

/// Convert, generate and project FiveM zone outlines
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// path to a JSON settings file
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// display debug information
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Import pasted script coordinates and print them in another dialect
    Convert {
        /// file to read; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ExportFormat::PolyZone)]
        format: ExportFormat,
    },

    /// Generate a template zone and print it
    Template {
        /// rectangle, circle, triangle, pentagon, hexagon, star or l-shape
        shape: ShapeKind,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// half-extent in world units; the settings default when omitted
        #[arg(long)]
        size: Option<f64>,

        /// degrees
        #[arg(long, default_value_t = 0.0)]
        rotation: f64,

        #[arg(long, value_enum, default_value_t = ExportFormat::PolyZone)]
        format: ExportFormat,
    },

    /// World coordinates to map coordinates
    Project {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },

    /// Map coordinates to world coordinates
    Unproject {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

impl CliArgs {
    /// Check that the arguments make sense before running anything
    pub fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.settings {
            if !path.is_file() {
                return Err(format!("Settings file not found: {}", path.display()));
            }
        }
        if let CliCommand::Convert {
            input: Some(path), ..
        } = &self.command
        {
            if !path.is_file() {
                return Err(format!("Input file not found: {}", path.display()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template_command() {
        let args = CliArgs::try_parse_from([
            "zonecreator",
            "template",
            "l-shape",
            "--x",
            "-250.5",
            "--y",
            "100",
            "--format",
            "vec3",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            CliCommand::Template {
                shape: ShapeKind::LShape,
                x: -250.5,
                y: 100.0,
                size: None,
                rotation: 0.0,
                format: ExportFormat::Vec3,
            }
        );
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        assert!(CliArgs::try_parse_from(["zonecreator", "template", "octagon", "--x", "0", "--y", "0"])
            .is_err());
    }

    #[test]
    fn test_missing_settings_file_fails_validation() {
        let args = CliArgs::try_parse_from([
            "zonecreator",
            "--settings",
            "/definitely/not/here.json",
            "project",
            "--x",
            "1",
            "--y",
            "2",
        ])
        .unwrap();
        assert!(args.validate().is_err());
    }
}
