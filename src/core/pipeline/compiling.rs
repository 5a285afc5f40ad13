use std::sync::Arc;

use tokio::{
    sync::mpsc::{Receiver, Sender},
    task::JoinHandle,
};

use crate::{
    constants::RES_TX_CLOSED,
    core::{
        domain::{CompileState, CompileTask},
        registry::AdapterRegistry,
    },
};

/// Compiles every task received on `compile_rx`, each on its own tokio task,
/// and reports every state change on `res_tx`.
#[tracing::instrument(skip_all)]
pub fn handle_compiling(
    res_tx: Sender<CompileTask>,
    mut compile_rx: Receiver<CompileTask>,
    registry: Arc<AdapterRegistry>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(task) = compile_rx.recv().await {
            let res_tx = res_tx.clone();
            let registry = registry.clone();

            tokio::spawn(async move {
                handle_task(task, res_tx, registry).await;
            });
        }
    })
}

#[tracing::instrument(skip_all, fields(id = %task.id, tag = %task.tag))]
async fn handle_task(task: CompileTask, res_tx: Sender<CompileTask>, registry: Arc<AdapterRegistry>) {
    let adapter = match registry.adapter(&task.tag) {
        Ok(adapter) => adapter,
        Err(e) => {
            report(&res_tx, task.change_state(CompileState::Failed { msg: e.to_string() })).await;
            return;
        }
    };

    let pending = registry.pending_locators(adapter.as_ref());
    let task = if pending.is_empty() {
        task
    } else {
        let task = task.change_state(CompileState::Loading { locators: pending });
        if !report(&res_tx, task.clone()).await {
            return;
        }
        task
    };

    let engines = match registry.load_engines(adapter.as_ref()).await {
        Ok(engines) => engines,
        Err(e) => {
            report(&res_tx, task.change_state(CompileState::Failed { msg: e.to_string() })).await;
            return;
        }
    };

    let task = task.change_state(CompileState::Compiling);
    if !report(&res_tx, task.clone()).await {
        return;
    }

    tracing::debug!("Start compiling");
    let state = match adapter.compile(&engines, &task.file).await {
        Ok(result) => CompileState::Succeeded(result),
        Err(e) => CompileState::Failed { msg: e.to_string() },
    };
    tracing::debug!("Compilation result: {:?}", state);

    report(&res_tx, task.change_state(state)).await;
}

/// Returns false once nobody is listening any more.
async fn report(res_tx: &Sender<CompileTask>, task: CompileTask) -> bool {
    match res_tx.send(task).await {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!("{}", RES_TX_CLOSED);
            false
        }
    }
}
