use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use raytracing::{
    CompileSettings, CompiledScene, SceneCompiler, TracingObserver,
    compiler::CompileObserver,
    scene::test_scenes,
};

#[derive(Debug, clap::Parser)]
struct CommandLineArguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    #[command(about = "Compile a builtin test scene and write it to disk")]
    Compile {
        #[arg(long, help = "Builtin test scene to compile (see list-scenes)")]
        scene_name: String,
        #[arg(short, long, help = "Output filename for the compiled scene")]
        output: PathBuf,
        #[arg(long, help = "Maximum triangles per BVH leaf")]
        leaf_size: Option<usize>,
        #[arg(long, action, help = "Omit the light-emitting primitive array")]
        no_lights: bool,
        #[arg(long, action, help = "Keep empty arrays empty instead of padding them to one element")]
        no_padding: bool,
    },
    #[command(about = "Print the array lengths of a compiled scene as JSON")]
    Inspect {
        #[arg(help = "Compiled scene file")]
        file: PathBuf,
    },
    #[command(about = "List all builtin test scenes as JSON")]
    ListScenes,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli_args = CommandLineArguments::parse();

    match cli_args.command {
        Command::Compile {
            scene_name,
            output,
            leaf_size,
            no_lights,
            no_padding,
        } => {
            let scene_descriptor = test_scenes::find_test_scene(&scene_name)
                .ok_or_else(|| anyhow!("unknown test scene {scene_name:?}"))?;
            let scene = (scene_descriptor.scene_func)();

            let defaults = CompileSettings::default();
            let settings = CompileSettings {
                max_triangles_per_leaf: leaf_size.unwrap_or(defaults.max_triangles_per_leaf),
                light_emitting_primitives: !no_lights,
                pad_empty_arrays: !no_padding,
            };

            let mut observer = TracingObserver;
            let mut observers: [&mut dyn CompileObserver; 1] = [&mut observer];
            let compiled = SceneCompiler::new(settings)
                .compile_with_observers(&scene, &mut observers)
                .with_context(|| format!("failed to compile scene {scene_name}"))?;

            compiled
                .write_to_path(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("wrote {}", output.display());
        }
        Command::Inspect { file } => {
            let compiled = CompiledScene::read_from_path(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;

            let arrays: serde_json::Map<String, serde_json::Value> = compiled
                .array_lengths()
                .into_iter()
                .map(|(name, len)| (name.to_owned(), len.into()))
                .collect();
            let summary = serde_json::json!({
                "name": compiled.name(),
                "arrays": arrays,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::ListScenes => {
            let scenes: Vec<&str> = test_scenes::all_test_scenes()
                .iter()
                .map(|s| s.name)
                .collect();
            println!("{}", serde_json::to_string(&scenes)?);
        }
    }

    Ok(())
}
