use std::io::{self, BufRead};
use std::time::Instant;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::board::{Move, Outcome};
use crate::perft::perft;
use crate::search::{Engine, EngineError, SearchParams};

pub struct CliSession {
    engine: Engine,
    json: bool,
}

impl CliSession {
    pub fn new(params: SearchParams, json: bool) -> Result<Self, EngineError> {
        Ok(Self {
            engine: Engine::new(params)?,
            json,
        })
    }

    /// Reads commands from stdin until quit or the game ends. The result of
    /// a finished game is announced after the command that ended it.
    pub fn run_loop(&mut self) -> Result<()> {
        println!("{}", self.engine.position());

        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(s) => s.trim().to_string(),
                Err(_) => break,
            };
            if line.is_empty() {
                continue;
            }
            if line == "quit" {
                break;
            }

            if let Err(err) = self.dispatch(&line) {
                println!("error: {err}");
                continue;
            }

            if let Some(outcome) = self.engine.game_result() {
                match outcome {
                    Outcome::Win(color) => println!("Result: {color} wins"),
                    Outcome::Draw => println!("Result: draw"),
                }
                break;
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> Result<()> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&cmd) = tokens.first() else {
            return Ok(());
        };
        match cmd {
            "go" => self.cmd_go(),
            "move" => self.cmd_move(&tokens[1..]),
            "moves" => self.cmd_moves(&tokens[1..]),
            "perft" => self.cmd_perft(&tokens[1..]),
            "help" => {
                self.cmd_help();
                Ok(())
            }
            other => bail!("unknown command: {other}"),
        }
    }

    fn cmd_go(&mut self) -> Result<()> {
        let report = self.engine.search()?;

        println!();
        println!("Total Iterations: {}", report.iterations);
        println!("Score:            {}", report.win_count);
        println!("Visits:           {}", report.visits);
        println!("Confidence:       {:.1}%", report.confidence);
        println!("Seldepth:         {}", report.seldepth);
        println!("Time:             {} ms", report.elapsed_ms);
        println!("IPS:              {:.0}", report.ips);
        println!("Nodes:            {}", report.nodes);
        println!();
        println!("best move {}", report.best_move);
        println!();

        if self.json {
            println!("{}", serde_json::to_string(&report)?);
        }

        self.engine.play_move(report.best_move)?;
        println!("{}", self.engine.position());
        Ok(())
    }

    fn cmd_move(&mut self, args: &[&str]) -> Result<()> {
        if args.len() < 2 {
            bail!("usage: move <row> <col>");
        }
        let row: u8 = args[0].parse()?;
        let col: u8 = args[1].parse()?;

        self.engine.play_move(Move::new(row, col))?;
        println!();
        println!("{}", self.engine.position());
        Ok(())
    }

    fn cmd_moves(&mut self, args: &[&str]) -> Result<()> {
        let radius: u8 = match args.first() {
            Some(s) => s.parse()?,
            None => 1,
        };
        print!("{}", self.engine.visualize_candidates(radius));
        Ok(())
    }

    /// Root-split perft: each first move runs on the worker pool against a
    /// private copy while a bar tracks finished branches.
    fn cmd_perft(&mut self, args: &[&str]) -> Result<()> {
        let depth: u32 = match args.first() {
            Some(s) => s.parse()?,
            None => 3,
        };

        let root_moves = self.engine.legal_moves();
        if depth == 0 {
            println!("nodes: 1");
            return Ok(());
        }
        if depth == 1 {
            println!("nodes: {}", root_moves.len());
            return Ok(());
        }

        let pb = ProgressBar::new(root_moves.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} moves")?
                .progress_chars("#>-"),
        );

        let start = Instant::now();
        let base = self.engine.position().clone();
        let nodes: u64 = root_moves
            .par_iter()
            .map(|&mv| {
                let mut position = base.clone();
                position.make_move(mv);
                let nodes = perft(&mut position, depth - 1);
                pb.inc(1);
                nodes
            })
            .sum();
        pb.finish_and_clear();

        let dt = start.elapsed().as_secs_f64();
        println!(
            "nodes: {nodes} elapsed: {dt:.3}s nps: {:.1}",
            nodes as f64 / dt.max(f64::EPSILON)
        );
        Ok(())
    }

    fn cmd_help(&self) {
        println!("go                search and play the engine move");
        println!("move <row> <col>  play a move");
        println!("moves [radius]    show candidate squares near the stones");
        println!("perft [depth]     count move sequences");
        println!("help              this message");
        println!("quit              exit");
    }
}
