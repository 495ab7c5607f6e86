mod tests_routing;
