pub mod rent_records;
