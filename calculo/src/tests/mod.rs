
// Solution set tests
mod solution;


// Parser tests
mod expression_parsing;
mod point_parsing;
