mod search_flow;
