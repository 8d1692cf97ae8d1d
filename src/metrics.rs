use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Opts, TextEncoder};

/// Register additional metrics of our own structs by using this registry instance.
static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry(prometheus::Registry::new()));

// Export special preconstructed counters for Teloxide's handlers.
pub static VOUCHES_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("vouches", Opts::new("vouches_detected_total", "count of counted vouch forwards"))
});
pub static CMD_DEC_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_dec", Opts::new("command_dec_usage_total", "count of /dec invocations"))
});
pub static CMD_RESET_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_reset", Opts::new("command_reset_usage_total", "count of /reset invocations"))
});
pub static CMD_SET_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_set", Opts::new("command_set_usage_total", "count of /set invocations"))
});
pub static ANNOUNCEMENT_EDITS: Lazy<AnnouncementEditCounters> = Lazy::new(|| {
    let opts = Opts::new("announcement_edits_total", "count of announcement edit attempts");
    AnnouncementEditCounters {
        updated: Counter::new("announcement_edits (updated)", opts.clone().const_label("state", "updated")),
        failed: Counter::new("announcement_edits (failed)", opts.const_label("state", "failed")),
    }
});

pub fn init() -> axum::Router {
    let prometheus = REGISTRY
        .register(&VOUCHES_COUNTER)
        .register(&CMD_DEC_COUNTER)
        .register(&CMD_RESET_COUNTER)
        .register(&CMD_SET_COUNTER)
        .register(&ANNOUNCEMENT_EDITS.updated)
        .register(&ANNOUNCEMENT_EDITS.failed)
        .unwrap();

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    axum::Router::new()
        .route("/metrics", get(|| async move {
            let mut buffer = vec![];
            let metrics = prometheus.gather();
            TextEncoder::new().encode(&metrics, &mut buffer).unwrap();
            let custom_metrics = String::from_utf8(buffer).unwrap();

            metric_handle.render() + custom_metrics.as_str()
        }))
        .layer(prometheus_layer)
}

pub struct Counter {
    inner: prometheus::Counter,
    name: String
}
pub struct AnnouncementEditCounters {
    updated: Counter,
    failed: Counter,
}
struct Registry(prometheus::Registry);

impl Counter {
    fn new(name: &str, opts: Opts) -> Counter {
        let c = prometheus::Counter::with_opts(opts)
            .unwrap_or_else(|e| panic!("unable to create {name} counter: {e}"));
        Counter { inner: c, name: name.to_string() }
    }

    pub fn inc(&self) {
        self.inner.inc()
    }
}

impl AnnouncementEditCounters {
    pub fn updated(&self) {
        self.updated.inc()
    }

    pub fn failed(&self) {
        self.failed.inc()
    }
}

impl Registry {
    fn register(&self, counter: &Counter) -> &Self {
        self.0.register(Box::new(counter.inner.clone()))
            .unwrap_or_else(|e| panic!("unable to register the {} counter: {e}", counter.name));
        self
    }

    fn unwrap(&self) -> prometheus::Registry {
        self.0.clone()
    }
}
