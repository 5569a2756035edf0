use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::state::AppState;

/// Business counters exposed on `/metrics`. Each state owns its own registry.
pub struct Metrics {
    registry: Registry,
    pub registrations: IntCounter,
    pub logins: IntCounterVec,
    pub bookings_confirmed: IntCounter,
    pub seats_sold: IntCounter,
    pub booking_conflicts: IntCounter,
    pub booking_revenue: IntCounter,
    pub reviews_posted: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let registrations = IntCounter::new("encore_registrations_total", "Accounts created")?;
        let logins = IntCounterVec::new(
            Opts::new("encore_logins_total", "Sign-in attempts by outcome"),
            &["outcome"],
        )?;
        let bookings_confirmed = IntCounter::new("encore_bookings_confirmed_total", "Bookings confirmed")?;
        let seats_sold = IntCounter::new("encore_seats_sold_total", "Seats sold across all shows")?;
        let booking_conflicts = IntCounter::new(
            "encore_booking_conflicts_total",
            "Confirmations refused because a seat was already sold",
        )?;
        let booking_revenue = IntCounter::new(
            "encore_booking_revenue_ugx_total",
            "Confirmed booking value in UGX",
        )?;
        let reviews_posted = IntCounter::new("encore_reviews_posted_total", "Reviews posted")?;

        registry.register(Box::new(registrations.clone()))?;
        registry.register(Box::new(logins.clone()))?;
        registry.register(Box::new(bookings_confirmed.clone()))?;
        registry.register(Box::new(seats_sold.clone()))?;
        registry.register(Box::new(booking_conflicts.clone()))?;
        registry.register(Box::new(booking_revenue.clone()))?;
        registry.register(Box::new(reviews_posted.clone()))?;

        Ok(Self {
            registry,
            registrations,
            logins,
            bookings_confirmed,
            seats_sold,
            booking_conflicts,
            booking_revenue,
            reviews_posted,
        })
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.bookings_confirmed.inc();
        metrics.logins.with_label_values(&["success"]).inc();

        let body = metrics.render().unwrap();
        assert!(body.contains("encore_bookings_confirmed_total 1"));
        assert!(body.contains("encore_logins_total{outcome=\"success\"} 1"));
    }
}
