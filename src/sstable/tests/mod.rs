mod tests_get;
mod tests_scan;
