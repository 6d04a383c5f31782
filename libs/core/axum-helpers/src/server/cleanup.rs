//! Database connection cleanup utilities.
//!
//! This module provides helpers for properly closing database connections
//! during graceful shutdown.

use tracing::{error, info};

/// Cleanup handler for MongoDB clients.
///
/// The driver keeps a connection pool alive in background tasks; shutting
/// the client down explicitly drains the pool instead of leaving sockets
/// to be dropped mid-write.
///
/// # Example
/// ```ignore
/// use axum_helpers::server::close_mongo;
///
/// close_mongo(client, "main").await;
/// ```
pub async fn close_mongo(client: mongodb::Client, name: &str) {
    client.shutdown().await;
    info!("MongoDB client '{}' shut down successfully", name);
}

/// Generic cleanup coordinator for multiple connections.
///
/// Runs all cleanup tasks concurrently and waits for all to complete.
///
/// # Example
/// ```ignore
/// use axum_helpers::server::{CleanupCoordinator, close_mongo};
///
/// let mut cleanup = CleanupCoordinator::new();
/// cleanup.add_task("mongodb", async { close_mongo(client, "main").await });
/// cleanup.run().await;
/// ```
pub struct CleanupCoordinator {
    tasks: Vec<(&'static str, tokio::task::JoinHandle<()>)>,
}

impl CleanupCoordinator {
    /// Create a new cleanup coordinator.
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Add a cleanup task with a name.
    ///
    /// The task will be spawned immediately and tracked for completion.
    pub fn add_task<F>(&mut self, name: &'static str, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        self.tasks.push((name, handle));
    }

    /// Run all cleanup tasks and wait for completion.
    ///
    /// Tasks are run concurrently. If any task panics or fails,
    /// it's logged but doesn't stop other tasks.
    pub async fn run(self) {
        info!("Running {} cleanup tasks", self.tasks.len());

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(_) => {
                    info!("Cleanup task '{}' completed successfully", name);
                }
                Err(e) => {
                    error!("Cleanup task '{}' failed: {}", name, e);
                }
            }
        }

        info!("All cleanup tasks completed");
    }
}

impl Default for CleanupCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
