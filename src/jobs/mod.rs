pub mod reconcile_scheduler;
