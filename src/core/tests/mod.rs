mod counter_scenario_tests;
