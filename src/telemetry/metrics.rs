//! Connection lifecycle metrics

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Successful handshakes
    Connects,
    /// Failed handshakes
    ConnectFailures,
    /// Read loop ended by an error or a server close
    ConnectionLost,
    /// Automatic reconnection attempts started
    ReconnectAttempts,
    /// Reconnection given up after the attempt ceiling
    ReconnectsExhausted,
    /// Inbound frames that were not a valid envelope
    FramesDropped,
    /// Handler tasks spawned, one per matching handler per event
    HandlerInvocations,
}

impl CounterMetric {
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::Connects => "paanj_admin_ws_connects_total",
            CounterMetric::ConnectFailures => "paanj_admin_ws_connect_failures_total",
            CounterMetric::ConnectionLost => "paanj_admin_ws_connection_lost_total",
            CounterMetric::ReconnectAttempts => "paanj_admin_ws_reconnect_attempts_total",
            CounterMetric::ReconnectsExhausted => "paanj_admin_ws_reconnects_exhausted_total",
            CounterMetric::FramesDropped => "paanj_admin_ws_frames_dropped_total",
            CounterMetric::HandlerInvocations => "paanj_admin_ws_handler_invocations_total",
        }
    }
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// 1 while the event stream is connected
    Connected,
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::Connected => "paanj_admin_ws_connected",
        }
    }
}

/// Increment a counter
pub fn increment(metric: CounterMetric, by: u64) {
    ::metrics::counter!(metric.name()).increment(by);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}
