//! Development server that compiles stylesheets on request.
//!
//! Every request runs through the [`Middleware`]: a `.css` request waits for
//! the compile gate, anything else is served from disk right away.

mod lifecycle;
mod path;
mod response;

use crate::{
    compiler::CompassCompiler,
    config::GateConfig,
    error::GateError,
    log,
    logger::ConsoleLogger,
    middleware::Middleware,
};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tiny_http::{Request, Server};
use tokio::runtime::Handle;

/// Request handling threads.
const POOL_SIZE: usize = 4;

/// Shared state for request workers.
struct ServeContext {
    middleware: Middleware<CompassCompiler>,
    root: PathBuf,
    runtime: Handle,
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    context: Arc<ServeContext>,
}

/// Bind the HTTP server and register it for Ctrl+C shutdown.
pub fn bind_server(config: &GateConfig, runtime: Handle) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server_for_shutdown(Arc::clone(&server));

    let compiler =
        CompassCompiler::with_logger(config.compass.clone(), Arc::new(ConsoleLogger::default()));
    let context = ServeContext {
        middleware: Middleware::from_config(compiler, &config.middleware),
        root: config.serve_root().to_path_buf(),
        runtime,
    };

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        context: Arc::new(context),
    })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the request loop (blocking until the server is unblocked).
    pub fn run(self) -> Result<()> {
        run_request_loop(&self.server, &self.context)
    }
}

fn run_request_loop(server: &Server, context: &Arc<ServeContext>) -> Result<()> {
    // Use thread pool so a long compile never blocks the accept loop
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(POOL_SIZE)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let context = Arc::clone(context);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &context) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, context: &ServeContext) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url = request.url().to_string();
    let served = context.runtime.block_on(
        context
            .middleware
            .handle(url.as_str(), || async { path::resolve_path(&url, &context.root) }),
    );

    match served {
        Ok(Some(path)) => response::respond_file(request, &path),
        Ok(None) => response::respond_not_found(request),
        Err(e @ GateError::InvalidInput(_)) => response::respond_error(request, 400, &e),
        Err(e) => {
            log!("serve"; "{url}: {e}");
            response::respond_error(request, 500, &e)
        }
    }
}
