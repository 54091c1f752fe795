//! A tokio based CLI runner.

use std::{future::Future, pin::pin, sync::mpsc, time::Duration};

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

/// How long a command may keep running after a shutdown signal to observe the cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Executes CLI commands.
#[derive(Debug)]
#[non_exhaustive]
pub struct CliRunner {
    tokio_runtime: Runtime,
}

impl CliRunner {
    /// Creates a new [CliRunner] on a default multi-threaded tokio runtime.
    pub fn try_default_runtime() -> Result<Self, std::io::Error> {
        Ok(Self { tokio_runtime: tokio_runtime()? })
    }

    /// Executes the given _async_ command on the tokio runtime until the command future resolves
    /// or until the process receives a `SIGINT` or `SIGTERM` signal.
    ///
    /// On a signal the context's cancellation token is fired and the command is given a short
    /// grace period to wind down before it is dropped.
    pub fn run_command_until_exit<F, E>(
        self,
        command: impl FnOnce(CliContext) -> F,
    ) -> Result<(), E>
    where
        F: Future<Output = Result<(), E>>,
        E: Send + Sync + From<std::io::Error> + 'static,
    {
        let context = CliContext { cancellation: CancellationToken::new() };
        let cancellation = context.cancellation.clone();

        let command_res =
            self.tokio_runtime.block_on(run_until_ctrl_c(command(context), cancellation));

        if command_res.is_err() {
            error!(target: "safe::cli", "shutting down due to error");
        } else {
            debug!(target: "safe::cli", "shutting down gracefully");
        }

        // `drop(tokio_runtime)` blocks until its pools are shut down, so drop it on a separate
        // thread and wait for at most five seconds.
        let tokio_runtime = self.tokio_runtime;
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("tokio-runtime-shutdown".to_string())
            .spawn(move || {
                drop(tokio_runtime);
                let _ = tx.send(());
            });

        if spawned.is_ok() {
            let _ = rx.recv_timeout(Duration::from_secs(5)).inspect_err(|err| {
                debug!(target: "safe::cli", %err, "tokio runtime shutdown timed out");
            });
        }

        command_res
    }
}

/// Additional context provided by the [CliRunner] when executing commands.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Fired when the process is asked to shut down.
    pub cancellation: CancellationToken,
}

/// Creates a new default tokio multi-thread [Runtime] with all features enabled.
pub fn tokio_runtime() -> Result<Runtime, std::io::Error> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}

/// Runs the future to completion or until `ctrl-c` (or `SIGTERM` on unix) is received.
async fn run_until_ctrl_c<F, E>(fut: F, cancellation: CancellationToken) -> Result<(), E>
where
    F: Future<Output = Result<(), E>>,
    E: Send + Sync + 'static + From<std::io::Error>,
{
    let mut fut = pin!(fut);

    {
        let signal = pin!(shutdown_signal());

        tokio::select! {
            res = signal => res?,
            res = &mut fut => return res,
        }
    }

    cancellation.cancel();

    match tokio::time::timeout(SHUTDOWN_GRACE, fut).await {
        Ok(res) => res,
        Err(_) => {
            debug!(target: "safe::cli", "command did not finish after cancellation");
            Ok(())
        }
    }
}

async fn shutdown_signal() -> Result<(), std::io::Error> {
    #[cfg(unix)]
    {
        let mut stream = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                trace!(target: "safe::cli", "Received ctrl-c");
            },
            _ = stream.recv() => {
                trace!(target: "safe::cli", "Received SIGTERM");
            },
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        trace!(target: "safe::cli", "Received ctrl-c");
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn command_result_is_returned() {
        let runner = CliRunner::try_default_runtime().unwrap();
        let res: Result<(), std::io::Error> = runner.run_command_until_exit(|ctx| async move {
            assert!(!ctx.cancellation.is_cancelled());
            Err(std::io::Error::other("boom"))
        });

        assert_eq!(res.unwrap_err().to_string(), "boom");
    }

    #[test]
    fn successful_command() {
        let runner = CliRunner::try_default_runtime().unwrap();
        let res: Result<(), std::io::Error> =
            runner.run_command_until_exit(|_| async move { Ok(()) });

        assert!(res.is_ok());
    }
}
