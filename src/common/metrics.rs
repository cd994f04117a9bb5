// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::core::stats::EngineStats;
use crate::store::strategies::StrategyStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

pub async fn spawn_metrics_server(
    port: u16,
    stats: Arc<EngineStats>,
    store: Arc<StrategyStore>,
) -> Option<SocketAddr> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::warn!("Metrics server failed to bind: {}", e);
            return None;
        }
    };

    let local = listener.local_addr().ok();
    if let Some(addr) = local {
        tracing::info!("Metrics server listening on {}", addr);
    }

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let body = render_metrics(&stats, &store);
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                }
                Err(e) => {
                    tracing::warn!("Metrics accept error: {}", e);
                    continue;
                }
            }
        }
    });

    local
}

fn render_metrics(stats: &Arc<EngineStats>, store: &Arc<StrategyStore>) -> String {
    let snapshot = stats.snapshot();
    let mut body = format!(
        concat!(
            "# TYPE strategies_created counter\nstrategies_created {}\n",
            "# TYPE delta_rounds counter\ndelta_rounds {}\n",
            "# TYPE executions counter\nexecutions {}\n",
            "# TYPE pre_swap_events counter\npre_swap_events {}\n",
            "# TYPE post_swap_events counter\npost_swap_events {}\n",
            "# TYPE hook_skips counter\nhook_skips {}\n",
            "# TYPE votes_cast counter\nvotes_cast {}\n",
            "# TYPE reports_generated counter\nreports_generated {}\n"
        ),
        snapshot.strategies_created,
        snapshot.delta_rounds,
        snapshot.executions,
        snapshot.pre_swap_events,
        snapshot.post_swap_events,
        snapshot.hook_skips,
        snapshot.votes_cast,
        snapshot.reports_generated,
    );

    body.push_str(&format!(
        "# TYPE strategies_total gauge\nstrategies_total {}\n",
        store.strategy_count()
    ));

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn metrics_endpoint_serves() {
        let stats = Arc::new(EngineStats::default());
        let store = Arc::new(StrategyStore::new());

        let addr = spawn_metrics_server(0, stats.clone(), store.clone())
            .await
            .expect("bind metrics");

        let body = reqwest::get(format!("http://{}", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(body.contains("strategies_created"));
        assert!(body.contains("strategies_total"));
    }
}
