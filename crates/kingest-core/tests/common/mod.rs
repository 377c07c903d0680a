pub mod fake_service;
