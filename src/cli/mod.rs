// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the flags, turns them into a RunConfig, and picks the
// backend the pipeline runs on:
//
//   --gpu cpu   → Autodiff<NdArray>
//   --gpu auto  → Autodiff<Wgpu>, default adapter
//   --gpu <n>   → Autodiff<Wgpu>, discrete GPU n
//
// A GPU that wgpu cannot find falls back to the CPU backend
// (see infra/device.rs).
//
// All work is delegated to Layer 2 (application).
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod args;

use anyhow::Result;
use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray, Wgpu};
use clap::Parser;

use crate::application::{
    config::RunConfig,
    pipeline::{run_pipeline, PipelineOutcome},
};
use crate::domain::run::DeviceSelector;
use crate::infra::device::{available_adapters, resolve_device, ResolvedDevice};
use args::RunArgs;

type CpuBackend = Autodiff<NdArray>;
type GpuBackend = Autodiff<Wgpu>;

#[derive(Parser, Debug)]
#[command(
    name = "clip-classifier",
    version,
    about = "Train or test a many-to-one sequence classifier on encoded clip features."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: RunArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config: RunConfig = self.args.into();
        tracing::debug!("{config:?}");

        let device = match config.gpu {
            DeviceSelector::Cpu => ResolvedDevice::Cpu,
            selector => resolve_device(selector, &available_adapters()),
        };
        let outcome = match device {
            ResolvedDevice::Cpu          => run_pipeline::<CpuBackend>(&config, &NdArrayDevice::Cpu)?,
            ResolvedDevice::Wgpu(device) => run_pipeline::<GpuBackend>(&config, &device)?,
        };

        if let PipelineOutcome::Trained(report) = outcome {
            if let Some(best) = report
                .history
                .iter()
                .min_by(|a, b| a.val_loss.total_cmp(&b.val_loss))
            {
                println!(
                    "Training complete. Best val loss {:.4} (acc {:.4}) at epoch {}.",
                    best.val_loss, best.val_acc, best.epoch + 1
                );
            }
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    use crate::domain::run::Mode;
    use crate::ml::model::ModelKind;

    fn parse(flags: &[&str]) -> Result<RunConfig, clap::Error> {
        let argv = std::iter::once("clip-classifier").chain(flags.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.args.into())
    }

    #[test]
    fn test_no_flags_gives_documented_defaults() {
        let cfg = parse(&[]).unwrap();
        assert_eq!(cfg.mode, Mode::Train);
        assert_eq!(cfg.model, ModelKind::BaselineLstm);
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.learning_rate, 1e-3);
        assert_eq!(cfg.epochs, 10);
        assert_eq!(cfg.gpu, DeviceSelector::Gpu(0));
        assert!(!cfg.encode);
        assert!(cfg.log.is_empty());
        assert_eq!(cfg.frame_selection().unwrap().len(), 60);
    }

    #[test]
    fn test_flags_reach_the_config() {
        let cfg = parse(&[
            "--mode", "test", "--model", "frame_mean", "--encode", "1", "--gpu", "cpu",
            "--batch-size", "8", "--learning-rate", "0.05", "--epochs", "3",
            "--encode-path", "enc", "--log", "",
        ]).unwrap();
        assert_eq!(cfg.mode, Mode::Test);
        assert_eq!(cfg.model, ModelKind::FrameMean);
        assert!(cfg.encode);
        assert_eq!(cfg.gpu, DeviceSelector::Cpu);
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.learning_rate, 0.05);
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.encode_path.as_deref(), Some(std::path::Path::new("enc")));
        assert!(!cfg.logging_enabled());
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(parse(&["--encode", "2"]).is_err());
        assert!(parse(&["--mode", "eval"]).is_err());
        assert!(parse(&["--model", "transformer"]).is_err());
        assert!(parse(&["--gpu", "fastest"]).is_err());
        assert!(parse(&["--batch-size", "ten"]).is_err());
    }

    #[test]
    fn test_every_flag_has_help_text() {
        let help = Cli::command().render_long_help().to_string();
        for line in [
            "Directory that run directories are created under",
            "Seed for weight initialisation",
            "First frame index kept from each clip",
            "Frame index where selection stops (exclusive)",
            "Stride between kept frames",
        ] {
            assert!(help.contains(line), "missing help: {line}");
        }
        for arg in Cli::command().get_arguments() {
            if arg.get_id() != "help" && arg.get_id() != "version" {
                assert!(arg.get_help().is_some(), "--{} has no help", arg.get_id());
            }
        }
    }
}
