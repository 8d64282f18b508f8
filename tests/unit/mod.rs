mod analysis_tests;
mod detection_tests;
mod scanner_tests;
