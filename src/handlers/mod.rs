// handlers/mod.rs - two-tier handler layout
//
// Public (no auth): system routes, categories, AI assistant
// Protected (bearer JWT): users, expenses, savings, goals, tasks
pub mod protected;
pub mod public;
