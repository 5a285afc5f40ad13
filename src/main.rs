use std::panic;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use playground_compilers::{
    config::load_config,
    core::{
        domain::{CompileState, CompileTask, SourceFile},
        pipeline::compiling::handle_compiling,
    },
    stubs::stub_registry,
};

const SAMPLES: [(&str, &str, &str); 8] = [
    ("styl", "main.styl", "body\n  color red\n  margin 0"),
    ("scss", "main.scss", "$c: red;\nbody { color: $c; }"),
    ("sass", "main.sass", "body\n  color: red"),
    ("less", "main.less", "@c: red;\nbody { color: @c; }"),
    ("ts", "main.ts", "const n: number = 1;\nconsole.log(n);"),
    ("babel", "main.jsx", "const el = <div />;\nlet n = 1;"),
    ("ls", "main.ls", "square = (x) -> x * x\nconsole.log square 4"),
    ("coffee", "main.coffee", "square = (x) -> x * x\nconsole.log square 4"),
];

#[tokio::main]
#[tracing::instrument]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    set_panic_hook();

    let config = load_config(None).await?;
    let (_, registry) = stub_registry(&config.engines, Duration::from_millis(200));
    let registry = Arc::new(registry);

    let (res_tx, mut res_rx) = mpsc::channel(64);
    let (compile_tx, compile_rx) = mpsc::channel(SAMPLES.len());
    handle_compiling(res_tx, compile_rx, registry.clone());

    let sends = SAMPLES.iter().map(|(tag, name, content)| {
        compile_tx.send(CompileTask::new(tag, SourceFile::new(name, content)))
    });
    for sent in join_all(sends).await {
        sent?;
    }
    drop(compile_tx);

    let mut finished = 0;
    while finished < SAMPLES.len() {
        let Some(task) = res_rx.recv().await else {
            break;
        };
        match &task.state {
            CompileState::Succeeded(result) => {
                finished += 1;
                tracing::info!(
                    "{} compiled ({} bytes, source map: {})",
                    task.tag,
                    result.code.len(),
                    result.source_map.is_some()
                );
            }
            CompileState::Failed { msg } => {
                finished += 1;
                tracing::error!("{} failed: {}", task.tag, msg);
            }
            state => tracing::info!("{}: {:?}", task.tag, state),
        }
    }

    for (locator, info) in registry.loader().entries() {
        tracing::info!(
            "{} requested at {}: {:?}",
            locator,
            info.requested_at,
            info.status
        );
    }

    Ok(())
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
