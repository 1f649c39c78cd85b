//! General-purpose tools
//!
//! A ready-made [`ToolProvider`] with a calculator, a clock, a random number
//! generator and two simulated lookups.

use std::fmt::Write as _;

use anyhow::{Context, anyhow, bail};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Value, json};

use crate::message::ToolArguments;
use crate::tool::{ParamType, ParameterSchema, Tool, ToolProvider};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Deepest nesting of parentheses and unary operators the calculator accepts
const MAX_DEPTH: usize = 256;

const WEATHER_CONDITIONS: &[&str] = &[
    "Sunny",
    "Partly Cloudy",
    "Cloudy",
    "Rainy",
    "Snowy",
    "Windy",
];

/// Provider of general purpose tools
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneralTools;

impl ToolProvider for GeneralTools {
    fn name(&self) -> &str {
        "general"
    }

    fn tools(&self) -> Vec<Tool> {
        vec![
            Tool::from_fn("calculator", "Evaluate a mathematical expression", calculate).param(
                ParameterSchema::required("expression", ParamType::String).with_description(
                    "Mathematical expression to evaluate (e.g., '2 + 2', 'sqrt(16) * 3')",
                ),
            ),
            Tool::from_fn(
                "get_current_time",
                "Get the current date and time",
                current_time,
            )
            .param(ParameterSchema::optional("format", json!(DEFAULT_TIME_FORMAT)))
            .docs("format: strftime-style format string for the date and time"),
            Tool::from_fn(
                "search_wikipedia",
                "Search Wikipedia for information (simulated)",
                search_wikipedia,
            )
            .param(
                ParameterSchema::required("query", ParamType::String)
                    .with_description("Search query"),
            ),
            Tool::from_fn(
                "get_weather",
                "Get weather information for a location (simulated)",
                weather,
            )
            .param(
                ParameterSchema::required("location", ParamType::String)
                    .with_description("Location to get weather for"),
            )
            .param(
                ParameterSchema::optional("unit", json!("celsius"))
                    .with_description("Temperature unit")
                    .with_enum(vec![json!("celsius"), json!("fahrenheit")]),
            ),
            Tool::from_fn(
                "generate_random_number",
                "Generate a random number within a range",
                random_number,
            )
            .param(ParameterSchema::optional("min_value", json!(1)))
            .param(ParameterSchema::optional("max_value", json!(100)))
            .docs(
                "Args:\n    min_value: Minimum value (inclusive)\n    max_value: Maximum value (inclusive)",
            ),
        ]
    }
}

fn str_arg<'a>(args: &'a ToolArguments, name: &str) -> anyhow::Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("'{name}' must be a string"))
}

/// Integers sometimes arrive as numeric strings
fn int_arg(args: &ToolArguments, name: &str) -> anyhow::Result<i64> {
    match args.get(name) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| anyhow!("'{name}' must be an integer")),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .with_context(|| format!("'{name}' must be an integer")),
        _ => bail!("'{name}' must be an integer"),
    }
}

/// Evaluation failures are a normal answer for the model, not a tool failure
fn calculate(args: &ToolArguments) -> anyhow::Result<Value> {
    let expression = str_arg(args, "expression")?;
    let text = match evaluate(expression) {
        Ok(value) => format!("Result: {value}"),
        Err(e) => format!("Error calculating: {e}"),
    };
    Ok(json!(text))
}

fn current_time(args: &ToolArguments) -> anyhow::Result<Value> {
    let format = args
        .get("format")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TIME_FORMAT);

    let mut out = String::new();
    write!(out, "{}", chrono::Local::now().format(format))
        .map_err(|_| anyhow!("invalid time format '{format}'"))?;
    Ok(json!(out))
}

fn search_wikipedia(args: &ToolArguments) -> anyhow::Result<Value> {
    let query = str_arg(args, "query")?;
    Ok(json!(format!(
        "Results for '{query}' (simulated Wikipedia search):\n\
         This is a simulated response for demonstration purposes. \
         In a real implementation, this would connect to Wikipedia's API."
    )))
}

fn weather(args: &ToolArguments) -> anyhow::Result<Value> {
    let location = str_arg(args, "location")?;
    let unit = args
        .get("unit")
        .and_then(Value::as_str)
        .unwrap_or("celsius")
        .to_lowercase();

    let mut rng = rand::thread_rng();
    let celsius: i32 = rng.gen_range(0..=30);
    let condition = WEATHER_CONDITIONS.choose(&mut rng).unwrap_or(&"Sunny");

    let (temp, symbol) = match unit.as_str() {
        "fahrenheit" => (f64::from(celsius) * 9.0 / 5.0 + 32.0, 'F'),
        "celsius" => (f64::from(celsius), 'C'),
        other => bail!("unknown unit '{other}', expected 'celsius' or 'fahrenheit'"),
    };

    Ok(json!(format!(
        "Weather in {location} (simulated): {temp}°{symbol}, {condition}"
    )))
}

fn random_number(args: &ToolArguments) -> anyhow::Result<Value> {
    let min = int_arg(args, "min_value")?;
    let max = int_arg(args, "max_value")?;
    if min > max {
        return Ok(json!(format!(
            "Error: min_value ({min}) cannot be greater than max_value ({max})"
        )));
    }

    let number = rand::thread_rng().gen_range(min..=max);
    Ok(json!(format!(
        "Random number between {min} and {max}: {number}"
    )))
}

/// Evaluate an arithmetic expression.
///
/// Supports `+ - * / % ^`, parentheses, unary minus, the constants `pi` and
/// `e`, and the functions `sqrt abs sin cos tan ln log exp floor ceil round`.
pub fn evaluate(expression: &str) -> Result<f64, String> {
    let mut parser = Parser {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };
    if parser.chars.is_empty() {
        return Err("empty expression".into());
    }

    let value = parser.expression()?;
    match parser.peek() {
        None if value.is_finite() => Ok(value),
        None => Err("result is not a finite number".into()),
        Some(c) => Err(format!("unexpected '{c}' at position {}", parser.pos)),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    // term := power (('*' | '/' | '%') power)*
    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.power()?;
        loop {
            if self.eat('*') {
                value *= self.power()?;
            } else if self.eat('/') {
                let rhs = self.power()?;
                if rhs == 0.0 {
                    return Err("Division by zero".into());
                }
                value /= rhs;
            } else if self.eat('%') {
                let rhs = self.power()?;
                if rhs == 0.0 {
                    return Err("Division by zero".into());
                }
                value %= rhs;
            } else {
                return Ok(value);
            }
        }
    }

    // power := unary ('^' power)?   (right associative)
    fn power(&mut self) -> Result<f64, String> {
        let base = self.unary()?;
        if self.eat('^') {
            self.descend()?;
            let exponent = self.power();
            self.depth -= 1;
            return Ok(base.powf(exponent?));
        }
        Ok(base)
    }

    fn descend(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("expression nested too deeply".into());
        }
        Ok(())
    }

    // Parentheses, functions and prefix operators all recurse through here
    fn unary(&mut self) -> Result<f64, String> {
        self.descend()?;

        let value = if self.eat('-') {
            self.unary().map(|v| -v)
        } else if self.eat('+') {
            self.unary()
        } else {
            self.primary()
        };

        self.depth -= 1;
        value
    }

    fn primary(&mut self) -> Result<f64, String> {
        if self.eat('(') {
            let value = self.expression()?;
            if !self.eat(')') {
                return Err("missing closing parenthesis".into());
            }
            return Ok(value);
        }

        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.identifier(),
            Some(c) => Err(format!("unexpected '{c}' at position {}", self.pos)),
            None => Err("unexpected end of expression".into()),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map_err(|e| format!("invalid number '{text}': {e}"))
    }

    fn identifier(&mut self) -> Result<f64, String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();

        match name.as_str() {
            "pi" => return Ok(std::f64::consts::PI),
            "e" => return Ok(std::f64::consts::E),
            _ => {}
        }

        if !self.eat('(') {
            return Err(format!("unknown identifier '{name}'"));
        }
        let arg = self.expression()?;
        if !self.eat(')') {
            return Err("missing closing parenthesis".into());
        }

        let value = match name.as_str() {
            "sqrt" if arg < 0.0 => return Err("square root of a negative number".into()),
            "sqrt" => arg.sqrt(),
            "abs" => arg.abs(),
            "sin" => arg.sin(),
            "cos" => arg.cos(),
            "tan" => arg.tan(),
            "ln" => arg.ln(),
            "log" => arg.log10(),
            "exp" => arg.exp(),
            "floor" => arg.floor(),
            "ceil" => arg.ceil(),
            "round" => arg.round(),
            _ => return Err(format!("unknown function '{name}'")),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ToolContext, ToolRegistry, parse_arguments};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_calculator() {
        assert!(close(evaluate("2 + 2").unwrap(), 4.0));
        assert!(close(evaluate("10 * 5").unwrap(), 50.0));
        assert!(close(evaluate("(2 + 3) * 4").unwrap(), 20.0));
        assert!(close(evaluate("2 ^ 8").unwrap(), 256.0));
        assert!(close(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0));
        assert!(close(evaluate("-3 + 5").unwrap(), 2.0));
        assert!(close(evaluate("10 - 2 - 3").unwrap(), 5.0));
        assert!(close(evaluate("sqrt(16) * 3").unwrap(), 12.0));
        assert!(close(evaluate("7 % 4").unwrap(), 3.0));
        assert!(close(evaluate("2 * pi").unwrap(), std::f64::consts::TAU));
    }

    #[test]
    fn test_calculator_errors() {
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("foo(1)").is_err());
        assert!(evaluate("").is_err());
        assert!(evaluate("3)").is_err());
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        assert!(close(evaluate(&format!("{}1{}", "(".repeat(50), ")".repeat(50))).unwrap(), 1.0));

        let err = evaluate(&"(".repeat(200_000)).unwrap_err();
        assert_eq!(err, "expression nested too deeply");
        let err = evaluate(&format!("{}1", "-".repeat(200_000))).unwrap_err();
        assert_eq!(err, "expression nested too deeply");
        let err = evaluate(&format!("{}2", "2^".repeat(200_000))).unwrap_err();
        assert_eq!(err, "expression nested too deeply");
    }

    #[test]
    fn test_provider_tools() {
        let mut registry = ToolRegistry::new();
        registry.register_provider(GeneralTools);

        assert_eq!(
            registry.tool_names(),
            vec![
                "calculator",
                "get_current_time",
                "search_wikipedia",
                "get_weather",
                "generate_random_number"
            ]
        );
        assert_eq!(registry.providers(), ["general".to_string()]);

        let schema = registry.get_tool("generate_random_number").unwrap().schema();
        let props = &schema.function.parameters.properties;
        assert_eq!(props["min_value"]["type"], "integer");
        assert_eq!(props["min_value"]["description"], "Minimum value (inclusive)");
        assert!(schema.function.parameters.required.is_empty());
    }

    async fn run(tool: &str, args: Value) -> Result<Value, crate::error::ToolError> {
        let tools = GeneralTools.tools();
        let tool = tools.iter().find(|t| t.name() == tool).unwrap();
        tool.execute(parse_arguments(&args), &ToolContext::detached())
            .await
    }

    #[tokio::test]
    async fn test_calculator_tool() {
        let value = run("calculator", json!({"expression": "6 * 7"})).await.unwrap();
        assert_eq!(value, json!("Result: 42"));

        let value = run("calculator", json!({"expression": "1/0"})).await.unwrap();
        assert_eq!(value, json!("Error calculating: Division by zero"));
    }

    #[tokio::test]
    async fn test_random_number_range() {
        let value = run("generate_random_number", json!({"min_value": 5, "max_value": "5"}))
            .await
            .unwrap();
        assert_eq!(value, json!("Random number between 5 and 5: 5"));

        let value = run("generate_random_number", json!({"min_value": 9, "max_value": 1}))
            .await
            .unwrap();
        assert_eq!(
            value,
            json!("Error: min_value (9) cannot be greater than max_value (1)")
        );
    }

    #[tokio::test]
    async fn test_weather_and_time() {
        let value = run("get_weather", json!({"location": "Oslo", "unit": "fahrenheit"}))
            .await
            .unwrap();
        let text = value.as_str().unwrap();
        assert!(text.starts_with("Weather in Oslo (simulated):"));
        assert!(text.contains("°F"));

        let value = run("get_current_time", json!({"format": "%Y"})).await.unwrap();
        assert_eq!(value.as_str().unwrap().len(), 4);
    }
}
