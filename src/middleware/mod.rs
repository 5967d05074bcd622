//! Request-level entry point: compile before a stylesheet is served.
//!
//! ```ignore
//! let middleware = Middleware::new(CompassCompiler::new(options));
//! let response = middleware
//!     .handle("/stylesheets/screen.css", || serve_file(path))
//!     .await?;
//! ```
//!
//! Requests the [`RequestFilter`] does not match go straight to `next`.
//! Matching requests wait for [`Compiler::compile`] first, so the file read
//! by `next` is the freshly compiled one.

mod filter;

pub use filter::{AssetRequest, RequestFilter};

use crate::compiler::Compiler;
use crate::config::{FailurePolicy, MiddlewareConfig, OptionsPatch};
use crate::debug;
use crate::error::Result;
use crate::logger::{ConsoleLogger, Logger};
use std::future::Future;
use std::sync::Arc;

pub struct Middleware<C> {
    compiler: C,
    filter: RequestFilter,
    policy: FailurePolicy,
    logger: Arc<dyn Logger>,
}

impl<C: Compiler> Middleware<C> {
    /// Middleware for `.css` requests that logs compile failures and serves
    /// anyway.
    pub fn new(compiler: C) -> Self {
        Self {
            compiler,
            filter: RequestFilter::default(),
            policy: FailurePolicy::Open,
            logger: Arc::new(ConsoleLogger::new("middleware")),
        }
    }

    /// Middleware configured from the `[middleware]` section.
    pub fn from_config(compiler: C, config: &MiddlewareConfig) -> Self {
        Self::new(compiler)
            .with_filter(RequestFilter::new(config.extension.clone()))
            .with_policy(config.on_error)
    }

    pub fn with_filter(mut self, filter: RequestFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn filter(&self) -> &RequestFilter {
        &self.filter
    }

    /// Run `next` once any compile this request needs has finished.
    ///
    /// With [`FailurePolicy::Open`] a failed compile is logged and `next`
    /// still runs. With [`FailurePolicy::Closed`] the error is returned and
    /// `next` is never called. Malformed requests are always an error.
    pub async fn handle<R, F, Fut, T>(&self, request: &R, next: F) -> Result<T>
    where
        R: AssetRequest + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !self.filter.should_handle(request)? {
            return Ok(next().await);
        }

        match self.compiler.compile(&OptionsPatch::new()).await {
            Ok(outcome) => {
                debug!("middleware"; "compile outcome: {}", outcome.code());
            }
            Err(err) if self.policy == FailurePolicy::Open => {
                self.logger.error(&format!("compile failed: {err}"));
            }
            Err(err) => return Err(err),
        }

        Ok(next().await)
    }
}
