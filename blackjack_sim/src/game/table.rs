use crate::game::player::PlayerSim;
use crate::game::strategy::{Action, Strategy, TableState};
use blackjack_lib::{hand_value, BlackjackGameError, Card, Hand, RunningCount, Shoe};
use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Payout multiplier of a natural blackjack.
pub const BLACKJACK_PAYOUT: f64 = 1.5;
/// The dealer draws until reaching at least this value.
pub const DEALER_STANDS_ON: u8 = 17;

/// The result of a transition, `Playing` while the hand is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
    Playing,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
            Outcome::Draw => "draw",
            Outcome::Playing => "playing",
        };
        write!(f, "{}", s)
    }
}

/// One decision of the player and what came of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: TableState,
    pub action: Action,
    pub reward: f64,
    pub outcome: Outcome,
}

impl Transition {
    pub fn new(state: TableState, action: Action, reward: f64, outcome: Outcome) -> Transition {
        Transition {
            state,
            action,
            reward,
            outcome,
        }
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.state, self.action, self.reward, self.outcome
        )
    }
}

/// Everything recorded about a single resolved round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub bet: u32,
    pub player_hand: Hand,
    pub dealer_hand: Hand,
    pub transitions: Vec<Transition>,
    /// Net reward of the round.
    pub reward: f64,
    /// Balance after the reward was applied.
    pub balance: f64,
    pub player_blackjack: bool,
}

impl RoundRecord {
    /// Final outcome of the round, taken from its last transition.
    pub fn outcome(&self) -> Outcome {
        self.transitions
            .last()
            .map(|t| t.outcome)
            .unwrap_or(Outcome::Draw)
    }
}

fn push_transition(transitions: &mut Vec<Transition>, transition: Transition) {
    trace!("{}", transition);
    transitions.push(transition);
}

/// Settles a stand against the dealer's final value. Order matters: dealer bust first,
/// then a tie, then dealer ahead, anything else is a player win.
pub fn resolve_showdown(player_value: u8, dealer_value: u8, bet: u32) -> (f64, Outcome) {
    let bet = bet as f64;
    if dealer_value > 21 {
        (bet, Outcome::Win)
    } else if dealer_value == player_value {
        (0.0, Outcome::Draw)
    } else if dealer_value > player_value {
        (-bet, Outcome::Lose)
    } else {
        (bet, Outcome::Win)
    }
}

/// Struct for a simulated blackjack table, owns the shoe, the running count and the dealer's hand.
pub struct BlackjackTableSim {
    shoe: Shoe,
    count: RunningCount,
    pub dealers_hand: Hand,
    hole_card_counted: bool,
    pub num_player_blackjacks: u32,
}

impl BlackjackTableSim {
    pub fn new(shoe: Shoe) -> Self {
        BlackjackTableSim {
            shoe,
            count: RunningCount::new(),
            dealers_hand: Hand::new(),
            hole_card_counted: true,
            num_player_blackjacks: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.shoe.remaining()
    }

    pub fn running_count(&self) -> i32 {
        self.count.running_count()
    }

    pub fn count(&self) -> &RunningCount {
        &self.count
    }

    /// Getter method for the dealers face up card.
    pub fn dealers_face_up_card(&self) -> Option<&Card> {
        self.dealers_hand.first()
    }

    /// Plays one round to completion for a stake of `bet`: deal, natural check, player turn,
    /// dealer turn and settlement. The reward is applied to the player's balance and the round is
    /// returned as a `RoundRecord`. Both hands are discarded afterwards.
    pub fn play_round<S: Strategy, R: Rng + ?Sized>(
        &mut self,
        player: &mut PlayerSim<S>,
        bet: u32,
        rng: &mut R,
    ) -> Result<RoundRecord, BlackjackGameError> {
        self.deal_hand(player)?;

        let mut transitions = Vec::new();
        let player_blackjack = player.hand_value() == 21;
        let reward = if player_blackjack {
            self.num_player_blackjacks += 1;
            self.resolve_natural(player, bet, &mut transitions)
        } else {
            self.play_player_turn(player, bet, rng, &mut transitions)?
        };

        // A busted player never sees the dealer play, the hole card is flipped at hand end.
        self.reveal_hole_card();
        player.settle(reward);

        let record = RoundRecord {
            bet,
            player_hand: player.hand().clone(),
            dealer_hand: self.dealers_hand.clone(),
            transitions,
            reward,
            balance: player.balance(),
            player_blackjack,
        };

        player.reset();
        self.reset();
        Ok(record)
    }

    /// Deals two cards each, alternating player and dealer. Everything is counted except the
    /// dealer's second card, which stays face down.
    fn deal_hand<S: Strategy>(&mut self, player: &mut PlayerSim<S>) -> Result<(), BlackjackGameError> {
        let card = self.draw_counted()?;
        player.receive_card(card);

        let card = self.draw_counted()?;
        self.dealers_hand.receive_card(card);

        let card = self.draw_counted()?;
        player.receive_card(card);

        let hole_card = self.shoe.draw()?;
        self.dealers_hand.receive_card(hole_card);
        self.hole_card_counted = false;

        trace!(
            "dealt player {} dealer up card {:?}",
            player.hand(),
            self.dealers_face_up_card()
        );
        Ok(())
    }

    /// Player holds 21 on the deal, the hand ends without any decision.
    fn resolve_natural<S: Strategy>(
        &mut self,
        player: &PlayerSim<S>,
        bet: u32,
        transitions: &mut Vec<Transition>,
    ) -> f64 {
        let state = self.current_table_state(player);
        self.reveal_hole_card();
        let (reward, outcome) = if self.dealers_hand.value() == 21 {
            (0.0, Outcome::Draw)
        } else {
            (bet as f64 * BLACKJACK_PAYOUT, Outcome::Win)
        };
        push_transition(transitions, Transition::new(state, Action::Stand, reward, outcome));
        reward
    }

    /// Lets the player hit until they stand or bust, then plays the dealer's hand if needed.
    /// Returns the net reward of the round.
    fn play_player_turn<S: Strategy, R: Rng + ?Sized>(
        &mut self,
        player: &mut PlayerSim<S>,
        bet: u32,
        rng: &mut R,
        transitions: &mut Vec<Transition>,
    ) -> Result<f64, BlackjackGameError> {
        loop {
            let state = self.current_table_state(player);
            match player.decide_option(&state, rng) {
                Action::Hit => {
                    let card = self.draw_counted()?;
                    player.receive_card(card);
                    if player.busted() {
                        let reward = -(bet as f64);
                        push_transition(
                            transitions,
                            Transition::new(state, Action::Hit, reward, Outcome::Lose),
                        );
                        return Ok(reward);
                    }
                    push_transition(
                        transitions,
                        Transition::new(state, Action::Hit, 0.0, Outcome::Playing),
                    );
                }
                Action::Stand => {
                    let player_value = player.hand_value();
                    let dealer_value = self.play_dealer_hand()?;
                    let (reward, outcome) = resolve_showdown(player_value, dealer_value, bet);
                    push_transition(
                        transitions,
                        Transition::new(state, Action::Stand, reward, outcome),
                    );
                    return Ok(reward);
                }
            }
        }
    }

    /// Reveals the hole card and draws until the dealer reaches `DEALER_STANDS_ON`.
    fn play_dealer_hand(&mut self) -> Result<u8, BlackjackGameError> {
        self.reveal_hole_card();
        while self.dealers_hand.value() < DEALER_STANDS_ON {
            let card = self.draw_counted()?;
            self.dealers_hand.receive_card(card);
        }
        Ok(self.dealers_hand.value())
    }

    fn current_table_state<S: Strategy>(&self, player: &PlayerSim<S>) -> TableState {
        let dealer_up_value = self
            .dealers_face_up_card()
            .map(|card| hand_value(std::slice::from_ref(card)))
            .unwrap_or_default();
        TableState::new(player.hand_value(), dealer_up_value, self.count.running_count())
    }

    fn draw_counted(&mut self) -> Result<Card, BlackjackGameError> {
        let card = self.shoe.draw()?;
        self.count.update(&card);
        Ok(card)
    }

    /// Counts the hole card, once per round.
    fn reveal_hole_card(&mut self) {
        if self.hole_card_counted {
            return;
        }
        if let Some(card) = self.dealers_hand.cards().get(1) {
            self.count.update(card);
        }
        self.hole_card_counted = true;
    }

    /// Method for reseting the table for another round, does not reshuffle the shoe.
    pub fn reset(&mut self) {
        self.dealers_hand.clear();
        self.hole_card_counted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::strategy::{DecisionStrategy, PlayerStrategy, WeightedBettingStrategy};
    use blackjack_lib::{Rank, Suit};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::VecDeque;

    /// Plays a fixed list of actions, then stands.
    struct Scripted(VecDeque<Action>);

    impl DecisionStrategy for Scripted {
        fn decide_option<R: Rng + ?Sized>(&mut self, _state: &TableState, _rng: &mut R) -> Action {
            self.0.pop_front().unwrap_or(Action::Stand)
        }
    }

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Hearts)
    }

    /// Stacks the shoe: player, dealer up, player, dealer hole, then `rest`.
    fn table(player: [Rank; 2], dealer: [Rank; 2], rest: &[Rank]) -> BlackjackTableSim {
        let mut cards = vec![card(player[0]), card(dealer[0]), card(player[1]), card(dealer[1])];
        cards.extend(rest.iter().map(|&r| card(r)));
        BlackjackTableSim::new(Shoe::from_deal_order(cards))
    }

    fn player(actions: &[Action]) -> PlayerSim<PlayerStrategy<Scripted, WeightedBettingStrategy>> {
        let betting = WeightedBettingStrategy::new(vec![50], &[1.0]).unwrap();
        let strategy = PlayerStrategy::new(Scripted(actions.iter().copied().collect()), betting);
        PlayerSim::new(500.0, strategy)
    }

    #[test]
    fn natural_pays_three_to_two() {
        let mut table = table([Rank::Ace, Rank::King], [Rank::Nine, Rank::Five], &[]);
        let mut player = player(&[]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let record = table.play_round(&mut player, 50, &mut rng).unwrap();

        assert_eq!(record.reward, 75.0);
        assert_eq!(record.outcome(), Outcome::Win);
        assert!(record.player_blackjack);
        assert_eq!(record.transitions.len(), 1);
        assert_eq!(record.transitions[0].action, Action::Stand);
        assert_eq!(record.transitions[0].state, TableState::new(21, 9, -2));
        assert_eq!(player.balance(), 575.0);
        // ace, nine, king, then the hole card five on reveal
        assert_eq!(table.running_count(), -1);
    }

    #[test]
    fn natural_against_dealer_21_is_a_draw() {
        let mut table = table([Rank::Ace, Rank::Queen], [Rank::King, Rank::Ace], &[]);
        let mut player = player(&[]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let record = table.play_round(&mut player, 50, &mut rng).unwrap();

        assert_eq!(record.reward, 0.0);
        assert_eq!(record.outcome(), Outcome::Draw);
        assert_eq!(player.balance(), 500.0);
    }

    #[test]
    fn dealer_bust_pays_the_bet() {
        let mut table = table([Rank::Ten, Rank::Eight], [Rank::Ten, Rank::Six], &[Rank::Queen]);
        let mut player = player(&[Action::Stand]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let record = table.play_round(&mut player, 50, &mut rng).unwrap();

        assert_eq!(record.reward, 50.0);
        assert_eq!(record.outcome(), Outcome::Win);
        assert_eq!(record.dealer_hand.value(), 26);
        assert_eq!(player.balance(), 550.0);
    }

    #[test]
    fn hit_then_bust_loses_the_bet() {
        let mut table = table(
            [Rank::Ten, Rank::Two],
            [Rank::Seven, Rank::Six],
            &[Rank::Three, Rank::King],
        );
        let mut player = player(&[Action::Hit, Action::Hit]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let record = table.play_round(&mut player, 50, &mut rng).unwrap();

        assert_eq!(record.transitions.len(), 2);
        assert_eq!(record.transitions[0].outcome, Outcome::Playing);
        assert_eq!(record.transitions[0].reward, 0.0);
        assert_eq!(record.transitions[0].state, TableState::new(12, 7, 0));
        assert_eq!(record.transitions[1].outcome, Outcome::Lose);
        assert_eq!(record.transitions[1].reward, -50.0);
        assert_eq!(record.transitions[1].state, TableState::new(15, 7, 1));
        assert_eq!(record.reward, -50.0);
        assert_eq!(player.balance(), 450.0);
        // the dealer never played, but the hole card was still counted at hand end
        assert_eq!(record.dealer_hand.len(), 2);
        assert_eq!(table.running_count(), 1);
    }

    #[test]
    fn dealer_ahead_wins_and_ties_push() {
        let mut table_lose = table([Rank::Ten, Rank::Seven], [Rank::Ten, Rank::Eight], &[]);
        let mut player_lose = player(&[Action::Stand]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let record = table_lose.play_round(&mut player_lose, 50, &mut rng).unwrap();
        assert_eq!(record.outcome(), Outcome::Lose);
        assert_eq!(record.reward, -50.0);

        let mut table_push = table([Rank::Ten, Rank::Eight], [Rank::Nine, Rank::Nine], &[]);
        let mut player_push = player(&[Action::Stand]);
        let record = table_push.play_round(&mut player_push, 50, &mut rng).unwrap();
        assert_eq!(record.outcome(), Outcome::Draw);
        assert_eq!(record.reward, 0.0);
    }

    #[test]
    fn dealer_draws_to_seventeen() {
        let mut table = table(
            [Rank::Ten, Rank::Nine],
            [Rank::Two, Rank::Three],
            &[Rank::Four, Rank::Ace, Rank::Five],
        );
        let mut player = player(&[Action::Stand]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let record = table.play_round(&mut player, 50, &mut rng).unwrap();
        // 2 + 3 + 4 + A(11) = 20
        assert_eq!(record.dealer_hand.value(), 20);
        assert_eq!(record.dealer_hand.len(), 4);
        assert_eq!(record.outcome(), Outcome::Lose);
        assert_eq!(table.remaining(), 1);
    }

    #[test]
    fn hole_card_counted_when_dealer_turn_starts() {
        let mut table = table(
            [Rank::Ten, Rank::Seven],
            [Rank::Five, Rank::Six],
            &[Rank::Two, Rank::Three, Rank::Four],
        );
        let mut player = player(&[Action::Stand]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let record = table.play_round(&mut player, 50, &mut rng).unwrap();

        assert_eq!(record.transitions.len(), 1);
        // ten, five, seven: the hole card is still face down when the player stands
        assert_eq!(record.transitions[0].state, TableState::new(17, 5, 0));
        assert_eq!(record.dealer_hand.value(), 20);
        assert_eq!(record.outcome(), Outcome::Lose);
        // hole card six plus the dealer's two, three and four
        assert_eq!(table.running_count(), 4);
    }

    #[test]
    fn showdown_ordering() {
        assert_eq!(resolve_showdown(22, 22, 10), (10.0, Outcome::Win));
        assert_eq!(resolve_showdown(18, 22, 10), (10.0, Outcome::Win));
        assert_eq!(resolve_showdown(18, 19, 10), (-10.0, Outcome::Lose));
        assert_eq!(resolve_showdown(18, 18, 10), (0.0, Outcome::Draw));
        assert_eq!(resolve_showdown(20, 17, 10), (10.0, Outcome::Win));
    }

    #[test]
    fn empty_shoe_is_an_error() {
        let mut table = BlackjackTableSim::new(Shoe::from_deal_order(vec![card(Rank::Two)]));
        let mut player = player(&[]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            table.play_round(&mut player, 50, &mut rng),
            Err(BlackjackGameError::ShoeEmpty)
        );
    }

    #[test]
    fn transition_display() {
        let t = Transition::new(TableState::new(20, 10, 3), Action::Stand, -25.0, Outcome::Lose);
        assert_eq!(
            t.to_string(),
            "[Player Sum: 20, Dealer Hand: 10, Running Count: 3] stand -25 lose"
        );
    }
}
