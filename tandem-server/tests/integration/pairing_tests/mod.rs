mod test_first_participant_waits;
mod test_scenario_four_participants;
mod test_two_participants_pair;
