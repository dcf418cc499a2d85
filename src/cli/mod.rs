//! Command-line interface for dockflow.
//!
//! A thin presentation layer over the pipeline: it reads the two input
//! files, assembles a `JobConfig`, runs the job, and prints the scored
//! poses. All real control flow lives in `core`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::core::DockingPipeline;
use crate::domain::{GridBox, JobConfig, PipelineResult, StructureRef};
use crate::engine::{DockingEngine, FormatConverter, ObabelConverter, VinaEngine};

/// dockflow - orchestrate AutoDock Vina docking runs
#[derive(Parser, Debug)]
#[command(name = "dockflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a docking job
    Run {
        /// Receptor structure file (pdbqt, or pdb/mol2/sdf to be converted)
        receptor: PathBuf,

        /// Ligand structure file (pdbqt, or pdb/mol2/sdf to be converted)
        ligand: PathBuf,

        /// YAML job definition; box/search flags below are ignored when set
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Search box center, X
        #[arg(long, default_value_t = 0.0)]
        center_x: f64,

        /// Search box center, Y
        #[arg(long, default_value_t = 0.0)]
        center_y: f64,

        /// Search box center, Z
        #[arg(long, default_value_t = 0.0)]
        center_z: f64,

        /// Search box size, X (Angstroms)
        #[arg(long, default_value_t = 20.0)]
        size_x: f64,

        /// Search box size, Y (Angstroms)
        #[arg(long, default_value_t = 20.0)]
        size_y: f64,

        /// Search box size, Z (Angstroms)
        #[arg(long, default_value_t = 20.0)]
        size_z: f64,

        /// Search effort (1-32)
        #[arg(short, long, default_value_t = 8)]
        exhaustiveness: u32,

        /// Number of binding modes to report
        #[arg(short, long, default_value_t = 9)]
        num_modes: u32,

        /// Docking engine executable (default: vina, or the job file's
        /// engine_path)
        #[arg(long, env = "DOCKFLOW_ENGINE")]
        engine: Option<PathBuf>,

        /// Structure-format converter executable (default: obabel, or the
        /// job file's converter_path)
        #[arg(long, env = "DOCKFLOW_CONVERTER")]
        converter: Option<PathBuf>,

        /// Abort the engine after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Ask the engine to write a log file alongside the run
        #[arg(long)]
        log: bool,

        /// Save the docked output structure to this path
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the engine and converter executables are runnable
    Probe {
        /// Docking engine executable
        #[arg(long, default_value = "vina", env = "DOCKFLOW_ENGINE")]
        engine: PathBuf,

        /// Structure-format converter executable
        #[arg(long, default_value = "obabel", env = "DOCKFLOW_CONVERTER")]
        converter: PathBuf,
    },
}

impl Cli {
    /// Execute the parsed command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                receptor,
                ligand,
                job,
                center_x,
                center_y,
                center_z,
                size_x,
                size_y,
                size_z,
                exhaustiveness,
                num_modes,
                engine,
                converter,
                timeout_secs,
                log,
                out,
                json,
            } => {
                let mut config = match job {
                    Some(ref path) => JobConfig::from_file(path)
                        .with_context(|| format!("Failed to load job file {}", path.display()))?,
                    None => {
                        let mut config = JobConfig::new(
                            StructureRef::from_filename(receptor.display().to_string()),
                            StructureRef::from_filename(ligand.display().to_string()),
                        );
                        config.grid = GridBox {
                            center_x,
                            center_y,
                            center_z,
                            size_x,
                            size_y,
                            size_z,
                        };
                        config.exhaustiveness = exhaustiveness;
                        config.num_modes = num_modes;
                        config
                    }
                };

                // The actual bytes always come from the files on the command
                // line, whatever the job file declares
                config.receptor = StructureRef::from_filename(receptor.display().to_string());
                config.ligand = StructureRef::from_filename(ligand.display().to_string());
                // Flags override the job file only when actually passed
                if let Some(engine) = engine {
                    config.engine_path = engine;
                }
                if let Some(converter) = converter {
                    config.converter_path = converter;
                }
                if timeout_secs.is_some() {
                    config.timeout_seconds = timeout_secs;
                }
                if log {
                    config.write_log = true;
                }
                config.validate()?;

                let receptor_bytes = std::fs::read(&receptor)
                    .with_context(|| format!("Failed to read receptor {}", receptor.display()))?;
                let ligand_bytes = std::fs::read(&ligand)
                    .with_context(|| format!("Failed to read ligand {}", ligand.display()))?;

                let pipeline = DockingPipeline::from_config(&config);
                let result = pipeline
                    .run(&config, &receptor_bytes, &ligand_bytes)
                    .await?;

                if let Some(ref out_path) = out {
                    let content = result
                        .docked_output
                        .as_deref()
                        .context("No docked output was produced")?;
                    std::fs::write(out_path, content).with_context(|| {
                        format!("Failed to write docked output to {}", out_path.display())
                    })?;
                    println!("Docked structure saved to {}", out_path.display());
                }

                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_result(&result);
                }

                // Cleanup trouble never fails the job, but it is always
                // reported, whatever output shape was requested
                for warning in cleanup_warnings(&result) {
                    eprintln!("{warning}");
                }

                Ok(())
            }

            Commands::Probe { engine, converter } => {
                let engine = VinaEngine::new(engine);
                engine
                    .health_check()
                    .await
                    .context("Docking engine is not available")?;
                println!("engine: ok ({})", engine.name());

                let converter = ObabelConverter::new(converter);
                converter
                    .health_check()
                    .await
                    .context("Format converter is not available")?;
                println!("converter: ok ({})", converter.name());

                Ok(())
            }
        }
    }
}

/// Render the score table for a terminal
fn print_result(result: &PipelineResult) {
    if result.poses.is_empty() {
        println!("Engine reported no binding modes.");
        println!("--- engine output ---");
        println!("{}", result.stdout.trim_end());
        return;
    }

    println!("{:<6} {:>10} {:>10} {:>10}", "mode", "affinity", "rmsd l.b.", "rmsd u.b.");
    for pose in &result.poses {
        println!(
            "{:<6} {:>10.2} {:>10} {:>10}",
            pose.mode,
            pose.affinity,
            pose.rmsd_lb.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
            pose.rmsd_ub.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
        );
    }

    if let Some(best) = result.best_affinity() {
        println!("\nBest affinity: {best:.2} kcal/mol ({} ms)", result.duration_ms);
    }
}

/// Terminal warnings for artifact deletions that failed during release
fn cleanup_warnings(result: &PipelineResult) -> Vec<String> {
    result
        .cleanup_failures
        .iter()
        .map(|failure| format!("warning: {failure}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::domain::{CleanupFailure, JobState};

    const FAKE_ENGINE: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--out" ]; then out="$2"; fi
  shift
done
printf 'REMARK VINA RESULT\n' > "$out"
printf 'mode 1 -7.2 0.0 0.0\n'
"#;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn run_command(
        receptor: PathBuf,
        ligand: PathBuf,
        job: Option<PathBuf>,
        engine: Option<PathBuf>,
    ) -> Commands {
        Commands::Run {
            receptor,
            ligand,
            job,
            center_x: 0.0,
            center_y: 0.0,
            center_z: 0.0,
            size_x: 20.0,
            size_y: 20.0,
            size_z: 20.0,
            exhaustiveness: 8,
            num_modes: 9,
            engine,
            converter: None,
            timeout_secs: None,
            log: false,
            out: None,
            json: false,
        }
    }

    fn job_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let receptor = dir.join("receptor.pdbqt");
        let ligand = dir.join("ligand.pdbqt");
        std::fs::write(&receptor, b"RECEPTOR ATOMS").unwrap();
        std::fs::write(&ligand, b"LIGAND ATOMS").unwrap();
        (receptor, ligand)
    }

    #[test]
    fn test_engine_flags_parse_as_unset_when_omitted() {
        let cli = Cli::try_parse_from(["dockflow", "run", "r.pdbqt", "l.pdbqt"]).unwrap();
        match cli.command {
            Commands::Run {
                engine, converter, ..
            } => {
                assert!(engine.is_none());
                assert!(converter.is_none());
            }
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_job_file_engine_path_is_honored() {
        let dir = TempDir::new().unwrap();
        let engine = write_script(dir.path(), "fake-vina", FAKE_ENGINE);
        let (receptor, ligand) = job_inputs(dir.path());

        // The job file is the only place the working engine is named
        let job = dir.path().join("job.yaml");
        std::fs::write(
            &job,
            format!(
                r#"
receptor: {{ filename: receptor.pdbqt, format: pdbqt }}
ligand: {{ filename: ligand.pdbqt, format: pdbqt }}
engine_path: {}
"#,
                engine.display()
            ),
        )
        .unwrap();

        let cli = Cli {
            command: run_command(receptor, ligand, Some(job), None),
        };
        cli.execute().await.unwrap();
    }

    #[tokio::test]
    async fn test_engine_flag_overrides_job_file() {
        let dir = TempDir::new().unwrap();
        let engine = write_script(dir.path(), "fake-vina", FAKE_ENGINE);
        let (receptor, ligand) = job_inputs(dir.path());

        // Job file names a broken engine; the explicit flag must win
        let job = dir.path().join("job.yaml");
        std::fs::write(
            &job,
            r#"
receptor: { filename: receptor.pdbqt, format: pdbqt }
ligand: { filename: ligand.pdbqt, format: pdbqt }
engine_path: /nonexistent/vina
"#,
        )
        .unwrap();

        let cli = Cli {
            command: run_command(receptor, ligand, Some(job), Some(engine)),
        };
        cli.execute().await.unwrap();
    }

    #[test]
    fn test_cleanup_warnings_independent_of_pose_count() {
        let result = PipelineResult {
            job_id: uuid::Uuid::new_v4(),
            poses: Vec::new(),
            stdout: String::new(),
            stderr: String::new(),
            output_path: PathBuf::from("/tmp/out.pdbqt"),
            docked_output: None,
            state: JobState::Released,
            cleanup_failures: vec![CleanupFailure {
                path: PathBuf::from("/tmp/stale.pdbqt"),
                message: "permission denied".to_string(),
            }],
            duration_ms: 3,
            completed_at: chrono::Utc::now(),
        };

        let warnings = cleanup_warnings(&result);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("/tmp/stale.pdbqt"));
        assert!(warnings[0].contains("permission denied"));
    }
}
