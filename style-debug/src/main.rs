#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::main()
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process;
    use std::time::Duration;

    use anyhow::{bail, Context};
    use clap::{Parser, Subcommand};
    use tracing_subscriber::EnvFilter;

    use style_debug::scheduler::DeferredScheduler;
    use style_debug::spawn::TokioSpawner;
    use style_debug::trace::BacktraceResolver;
    use style_debug::{
        inspect_stylesheet, render_entries, DebugConfig, DebugContext, DebugEntry, DebugTarget,
        ScheduleStrategy, SourceCache, StyleSink,
    };

    #[derive(Parser)]
    #[command(name = "style-debug", version)]
    #[command(about = "Source-mapped debug rules for generated styles")]
    struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Build one debug style block from a JSON array of entries
        Render {
            /// JSON file: [{"selector", "fileName", "lineNumber"}, ...]
            entries: PathBuf,

            /// Read each referenced file into `sourcesContent`
            #[arg(long)]
            embed_sources: bool,

            /// Write output to file instead of stdout
            #[arg(short)]
            o: Option<PathBuf>,
        },

        /// Print `selector -> file:line` for every inline map in a stylesheet
        Inspect {
            /// CSS file containing injected debug blocks
            file: PathBuf,
        },

        /// Annotate a few styles natively and print the flushed block
        Demo {
            /// Number of annotations
            #[arg(long, default_value_t = 3)]
            count: usize,

            /// Frames to skip, counted from the innermost resolved frame
            #[arg(long, default_value_t = 0)]
            frame_index: usize,

            /// JSON config file (enabled, idleTimeoutMs, classPrefix)
            #[arg(long)]
            config: Option<PathBuf>,

            /// Idle callback timeout in milliseconds; overrides the config file
            #[arg(long)]
            idle_timeout_ms: Option<u32>,

            /// Schedule on the next frame instead of idle time
            #[arg(long)]
            next_paint: bool,
        },
    }

    pub fn main() {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();

        let cli = Cli::parse();
        let result = match cli.command {
            Commands::Render {
                entries,
                embed_sources,
                o,
            } => run_render(&entries, embed_sources, o.as_deref()),
            Commands::Inspect { file } => run_inspect(&file),
            Commands::Demo {
                count,
                frame_index,
                config,
                idle_timeout_ms,
                next_paint,
            } => run_demo(
                count,
                frame_index,
                config.as_deref(),
                idle_timeout_ms,
                next_paint,
            ),
        };

        if let Err(e) = result {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }

    fn run_render(path: &Path, embed_sources: bool, out: Option<&Path>) -> anyhow::Result<()> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let entries: Vec<DebugEntry> = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a JSON array of entries", path.display()))?;
        if entries.is_empty() {
            bail!("{} contains no entries", path.display());
        }

        let cache = SourceCache::new();
        if embed_sources {
            let base = path.parent().unwrap_or(Path::new("."));
            for entry in &entries {
                cache.get_or_load(&entry.file_name, |name| {
                    fs::read_to_string(base.join(name)).ok()
                });
            }
        }

        let css = render_entries(&entries, &cache)?;
        match out {
            Some(out) => {
                fs::write(out, &css).with_context(|| format!("cannot write {}", out.display()))?;
                eprintln!("  wrote {} rules to {}", entries.len(), out.display());
            }
            None => println!("{css}"),
        }
        Ok(())
    }

    fn run_inspect(path: &Path) -> anyhow::Result<()> {
        let css = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let found = inspect_stylesheet(&css)?;
        if found.is_empty() {
            eprintln!("  no inline source maps in {}", path.display());
        }
        for (selector, file, line) in found {
            println!("{selector} -> {file}:{line}");
        }
        Ok(())
    }

    struct StdoutSink;

    impl StyleSink for StdoutSink {
        fn append_style(&self, css: &str) -> style_debug::Result<()> {
            println!("<style>\n{css}\n</style>");
            Ok(())
        }
    }

    #[derive(Default)]
    struct DemoStyle {
        class: Option<String>,
    }

    impl DebugTarget for DemoStyle {
        fn set_debug_class_name(&mut self, class_name: &str) {
            self.class = Some(class_name.to_string());
        }
    }

    fn run_demo(
        count: usize,
        frame_index: usize,
        config: Option<&Path>,
        idle_timeout_ms: Option<u32>,
        next_paint: bool,
    ) -> anyhow::Result<()> {
        let mut config = match config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                DebugConfig::from_json(&text)?
            }
            None => DebugConfig::default(),
        };
        if let Some(ms) = idle_timeout_ms {
            config.idle_timeout_ms = ms;
        }
        let timeout = Duration::from_millis(config.idle_timeout_ms.into());
        let strategy = ScheduleStrategy::select(!next_paint, timeout);

        let ctx = DebugContext::builder()
            .config(config)
            .resolver(BacktraceResolver::new())
            .scheduler(DeferredScheduler::new(strategy))
            .sink(StdoutSink)
            .spawner(TokioSpawner)
            .build()?;
        ctx.enable_debug();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let local = tokio::task::LocalSet::new();
        local.block_on(&runtime, async {
            for _ in 0..count {
                let mut style = DemoStyle::default();
                ctx.add_debug_annotation(&mut style, frame_index);
                eprintln!("  created style with class {}", style.class.unwrap_or_default());
            }
        });
        // Drain the resolutions and the flush they schedule.
        // Pending work only holds weak references; keep the context alive
        // until it finishes.
        runtime.block_on(local);
        drop(ctx);
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn demo_accepts_idle_timeout_override() {
            let cli = Cli::try_parse_from(["style-debug", "demo", "--idle-timeout-ms", "50"]).unwrap();
            let Commands::Demo {
                idle_timeout_ms,
                count,
                ..
            } = cli.command
            else {
                panic!("expected demo");
            };
            assert_eq!(idle_timeout_ms, Some(50));
            assert_eq!(count, 3);
        }

        #[test]
        fn demo_timeout_defaults_to_config() {
            let cli = Cli::try_parse_from(["style-debug", "demo"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Demo {
                    idle_timeout_ms: None,
                    ..
                }
            ));
        }

        #[test]
        fn demo_runs_with_overridden_timeout() {
            run_demo(2, 0, None, Some(1), false).unwrap();
        }
    }
}
