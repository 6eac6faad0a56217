// Application form: server-side progress for the five-step wizard and final submissions.

pub mod handlers;
pub mod models;
