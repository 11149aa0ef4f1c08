//! プロンプト生成モジュール
//!
//! AI画風分析に渡す固定プロンプト。出力はStyleAnalysisのJSONスキーマに合わせる。

/// 画風分析プロンプト
pub const ANALYSIS_PROMPT: &str = r#"あなたは画像の著作権リスクを判定するアシスタントです。
以下の画像を分析し、JSON形式で回答してください。
専門用語は避け、誰でもわかる平易な日本語で書いてください。

分析項目:
1. similar_artists: この画像の絵柄が似ている有名なアーティストやクリエイターの名前（最大5名）。心当たりがなければ空配列。
2. style_description: この画像がどんな絵柄・雰囲気かを一言で説明（例:「水彩風のやわらかいタッチ」「アニメ調のキャラクターイラスト」など、50文字以内）。
3. risk_factors: 著作権的に気をつけるべきポイントをわかりやすく列挙。
   - 既存のキャラクターに似ている場合 → 「○○に似たキャラクターが含まれています」
   - 有名な作品の絵柄にそっくりな場合 → 「○○（作品名）の絵柄に近い印象です」
   - 企業ロゴや商標に似ている場合 → 「○○のロゴに似た要素があります」
   - 特に問題なければ空配列
4. recommendation: 3段階で判定。
   - "SAFE": 既存作品との類似性が低く、問題なさそう
   - "CAUTION": 似ている部分があるので念のため確認を推奨
   - "DANGER": 明らかに似ているため使用を避けるべき

回答はJSON形式のみ。説明文や前置きは不要。"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_every_schema_key() {
        for key in ["similar_artists", "style_description", "risk_factors", "recommendation"] {
            assert!(ANALYSIS_PROMPT.contains(key), "missing key: {}", key);
        }
    }

    #[test]
    fn test_prompt_lists_all_labels() {
        assert!(ANALYSIS_PROMPT.contains("\"SAFE\""));
        assert!(ANALYSIS_PROMPT.contains("\"CAUTION\""));
        assert!(ANALYSIS_PROMPT.contains("\"DANGER\""));
    }
}
