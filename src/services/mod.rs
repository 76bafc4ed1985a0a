pub mod clock;
pub mod due_dates;
pub mod invoice_rollup;
pub mod invoice_trends;
pub mod occupancy;
pub mod payment_status;
pub mod rent_guard;
