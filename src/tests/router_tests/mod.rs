mod listings_tests;
