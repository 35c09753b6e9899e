mod interface_tests;
