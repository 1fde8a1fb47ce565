pub mod http_signal_reporter;
